//! WAV writing and concatenation using hound.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use model_client::Waveform;
use std::fs;
use std::path::{Path, PathBuf};

/// One rendered file, in narration order.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub path: PathBuf,
    /// First chunk of an utterance; a silence gap goes before it
    pub starts_utterance: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblySummary {
    pub segments_written: usize,
    pub segments_skipped: usize,
    pub duration_ms: u64,
}

fn pcm16_spec(sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn to_i16(s: f32) -> i16 {
    (s * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Write a mono waveform as a 16-bit PCM WAV file.
pub fn write_waveform(path: &Path, waveform: &Waveform) -> Result<()> {
    let mut writer = WavWriter::create(path, pcm16_spec(waveform.sample_rate, 1))
        .with_context(|| format!("Cannot create WAV: {}", path.display()))?;
    for &s in &waveform.samples {
        writer.write_sample(to_i16(s))?;
    }
    writer.finalize().context("WAV finalise error")?;
    Ok(())
}

/// Read every sample of a WAV file as 16-bit PCM.
fn read_pcm16(path: &Path) -> Result<(WavSpec, Vec<i16>)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| to_i16(v as f32 / scale)))
                .collect::<Result<Vec<_>, _>>()?
        }
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(to_i16))
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok((spec, samples))
}

/// Concatenate segments into one 16-bit PCM WAV at `output_path`.
///
/// Silence of `gap_ms` is inserted before every segment that starts a new
/// utterance, except the first one written. The first readable segment fixes
/// the sample rate and channel count; segments that differ, or cannot be
/// read, are skipped with a warning. Fails without creating the output if no
/// segment can be written.
pub fn assemble_wav(
    segments: &[AudioSegment],
    output_path: &Path,
    gap_ms: u64,
) -> Result<AssemblySummary> {
    let reference = segments
        .iter()
        .find_map(|s| WavReader::open(&s.path).ok().map(|r| r.spec()))
        .context("No rendered audio to assemble")?;

    let out_spec = pcm16_spec(reference.sample_rate, reference.channels);
    let gap_samples =
        (reference.sample_rate as u64 * gap_ms / 1000) as usize * reference.channels as usize;

    write_via_part_file(output_path, |part_path| {
        let mut writer = WavWriter::create(part_path, out_spec)
            .with_context(|| format!("Cannot create WAV: {}", part_path.display()))?;

        let mut written = 0;
        let mut skipped = 0;
        let mut frames: u64 = 0;

        for segment in segments {
            let (spec, samples) = match read_pcm16(&segment.path) {
                Ok(read) => read,
                Err(e) => {
                    log::warn!("Skipping unreadable audio {}: {:#}", segment.path.display(), e);
                    skipped += 1;
                    continue;
                }
            };

            if spec.sample_rate != reference.sample_rate || spec.channels != reference.channels {
                log::warn!(
                    "Skipping {}: {} Hz x{} does not match {} Hz x{}",
                    segment.path.display(),
                    spec.sample_rate,
                    spec.channels,
                    reference.sample_rate,
                    reference.channels
                );
                skipped += 1;
                continue;
            }

            if written > 0 && segment.starts_utterance {
                for _ in 0..gap_samples {
                    writer.write_sample(0i16)?;
                }
                frames += (gap_samples / reference.channels as usize) as u64;
            }

            for &s in &samples {
                writer.write_sample(s)?;
            }
            frames += (samples.len() / reference.channels as usize) as u64;
            written += 1;
        }

        writer.finalize().context("WAV finalise error")?;

        if written == 0 {
            anyhow::bail!("No rendered audio could be assembled");
        }

        Ok(AssemblySummary {
            segments_written: written,
            segments_skipped: skipped,
            duration_ms: frames * 1000 / reference.sample_rate as u64,
        })
    })
}

/// Run `write` against `<output>.wav.part`, then move it into place.
///
/// The part file is removed whenever `write` or the final rename fails.
fn write_via_part_file<T>(
    output_path: &Path,
    write: impl FnOnce(&Path) -> Result<T>,
) -> Result<T> {
    let part_path = output_path.with_extension("wav.part");

    let result = write(&part_path).and_then(|value| {
        fs::rename(&part_path, output_path)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(value)
    });

    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }
    result
}
