//! Drive the speech engine over synthesis chunks, one at a time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use model_client::{SpeechRequest, SpeechSynthesizer};

use crate::audio::{self, AudioSegment};
use crate::config::VoiceCast;
use crate::text::SynthesisChunk;

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Rendered {
        path: PathBuf,
        duration_ms: u64,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct UnitResult {
    pub chunk: SynthesisChunk,
    pub outcome: UnitOutcome,
}

impl UnitResult {
    pub fn is_rendered(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Rendered { .. })
    }
}

/// Rendered units as assembler input, in order.
pub fn rendered_segments(results: &[UnitResult]) -> Vec<AudioSegment> {
    results
        .iter()
        .filter_map(|r| match &r.outcome {
            UnitOutcome::Rendered { path, .. } => Some(AudioSegment {
                path: path.clone(),
                starts_utterance: r.chunk.starts_utterance(),
            }),
            UnitOutcome::Skipped { .. } => None,
        })
        .collect()
}

pub struct SynthesisDriver<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    voices: &'a VoiceCast,
    unit_timeout: Duration,
    show_progress: bool,
}

impl<'a> SynthesisDriver<'a> {
    pub fn new(
        synthesizer: &'a dyn SpeechSynthesizer,
        voices: &'a VoiceCast,
        unit_timeout: Duration,
    ) -> Self {
        Self {
            synthesizer,
            voices,
            unit_timeout,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Render every chunk into `scratch_dir`, in order.
    ///
    /// A failing or timed-out chunk is recorded as skipped and the run moves
    /// on to the next one.
    pub async fn render_all(&self, chunks: &[SynthesisChunk], scratch_dir: &Path) -> Vec<UnitResult> {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(chunks.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut results = Vec::with_capacity(chunks.len());
        let mut skipped = 0;

        for chunk in chunks {
            let outcome = match self.render_one(chunk, scratch_dir).await {
                Ok(outcome) => outcome,
                Err(reason) => {
                    log::warn!(
                        "Skipping utterance {} chunk {}: {}",
                        chunk.utterance_index,
                        chunk.chunk_index,
                        reason
                    );
                    skipped += 1;
                    UnitOutcome::Skipped { reason }
                }
            };

            results.push(UnitResult {
                chunk: chunk.clone(),
                outcome,
            });
            pb.inc(1);
            if skipped > 0 {
                pb.set_message(format!("{} skipped", skipped));
            }
        }

        pb.finish_with_message(format!("Synthesis complete ({} skipped)", skipped));
        results
    }

    async fn render_one(
        &self,
        chunk: &SynthesisChunk,
        scratch_dir: &Path,
    ) -> std::result::Result<UnitOutcome, String> {
        let voice = self.voices.voice_for(chunk.kind).clone();
        let request = SpeechRequest::new(chunk.text.clone(), voice).with_emotion(chunk.emotion);

        log::debug!(
            "Synthesizing utterance {} chunk {} ({}) with {}",
            chunk.utterance_index,
            chunk.chunk_index,
            chunk.kind,
            self.synthesizer.name()
        );

        let waveform = tokio::time::timeout(self.unit_timeout, self.synthesizer.synthesize(&request))
            .await
            .map_err(|_| format!("timed out after {:?}", self.unit_timeout))?
            .map_err(|e| e.to_string())?;

        if waveform.is_empty() {
            return Err("engine returned no audio".to_string());
        }

        let path = scratch_dir.join(format!(
            "u{:06}_c{:03}.wav",
            chunk.utterance_index, chunk.chunk_index
        ));
        audio::write_waveform(&path, &waveform).map_err(|e| format!("{:#}", e))?;

        Ok(UnitOutcome::Rendered {
            path,
            duration_ms: waveform.duration_ms(),
        })
    }
}
