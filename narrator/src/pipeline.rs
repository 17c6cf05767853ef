//! Book → utterances → synthesis chunks.

use std::path::Path;
use std::time::Duration;

use model_client::EmotionClassifier;

use crate::config::NarratorConfig;
use crate::error::Result;
use crate::ingest::{self, Format, RawChunk};
use crate::structure::{self, ContentFilter, NarrativeBoundary};
use crate::text::{self, Segmenter, SynthesisChunk, Utterance};

/// The text side of a run: everything up to (not including) synthesis.
pub struct BookPipeline {
    boundary: NarrativeBoundary,
    content_filter: Option<ContentFilter>,
    segmenter: Segmenter,
}

impl BookPipeline {
    pub fn new(
        boundary: NarrativeBoundary,
        content_filter: Option<ContentFilter>,
        segmenter: Segmenter,
    ) -> Self {
        Self {
            boundary,
            content_filter,
            segmenter,
        }
    }

    pub fn from_config(config: &NarratorConfig) -> Result<Self> {
        let boundary = NarrativeBoundary::standard().with_patterns(&config.boundary.extra_patterns)?;
        log::debug!("Boundary rules: {:?}", boundary.rule_names());
        Ok(Self::new(boundary, config.pdf.filter(), Segmenter::new()?))
    }

    /// Extract raw chunks, dropping non-body blocks from PDFs.
    pub fn extract(&self, path: &Path) -> Result<Vec<RawChunk>> {
        let format = Format::from_path(path)?;
        let chunks = ingest::extract_chunks(path)?;
        Ok(self.filter_blocks(format, chunks))
    }

    /// Apply the content filter, which only runs on PDF blocks.
    fn filter_blocks(&self, format: Format, chunks: Vec<RawChunk>) -> Vec<RawChunk> {
        match (format, &self.content_filter) {
            (Format::Pdf, Some(filter)) => filter.filter(chunks),
            _ => chunks,
        }
    }

    /// Trim front matter and join the rest into one string.
    pub fn narrative_text(&self, chunks: Vec<RawChunk>) -> String {
        structure::join_chunks(&self.boundary.trim(chunks))
    }

    /// Normalize, segment and tag narrative text.
    pub fn utterances_from_text(&self, narrative: &str) -> Result<Vec<Utterance>> {
        let normalized = text::normalize(narrative);
        let sentences = self.segmenter.sentences(&normalized)?;

        let utterances: Vec<Utterance> = sentences
            .iter()
            .map(|s| text::tag_sentence(s))
            .filter(|(_, content)| !content.trim().is_empty())
            .enumerate()
            .map(|(index, (kind, content))| Utterance::new(index, kind, content))
            .collect();

        log::info!(
            "Segmented {} sentences into {} utterances",
            sentences.len(),
            utterances.len()
        );
        Ok(utterances)
    }

    /// Run every text stage on a book file.
    pub fn utterances(&self, path: &Path) -> Result<Vec<Utterance>> {
        let chunks = self.extract(path)?;
        let narrative = self.narrative_text(chunks);
        self.utterances_from_text(&narrative)
    }
}

/// Outcome counts of a classification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifySummary {
    pub classified: usize,
    pub failed_batches: usize,
}

/// Annotate utterances with emotions, `batch_size` sentences per call.
///
/// A batch that errors, exceeds `batch_timeout` or comes back with the wrong
/// number of predictions is logged and left unclassified; the remaining
/// batches still run.
pub async fn classify(
    classifier: &dyn EmotionClassifier,
    utterances: &mut [Utterance],
    batch_size: usize,
    batch_timeout: Duration,
) -> ClassifySummary {
    let mut summary = ClassifySummary::default();

    for batch in utterances.chunks_mut(batch_size.max(1)) {
        let sentences: Vec<String> = batch.iter().map(|u| u.text.clone()).collect();

        let outcome = match tokio::time::timeout(batch_timeout, classifier.classify(&sentences)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("timed out after {}s", batch_timeout.as_secs_f32())),
        };

        match outcome {
            Ok(predictions) if predictions.len() == batch.len() => {
                for (utterance, prediction) in batch.iter_mut().zip(predictions) {
                    utterance.emotion = Some(prediction.emotion);
                    utterance.score = Some(prediction.score);
                }
                summary.classified += batch.len();
            }
            Ok(predictions) => {
                log::warn!(
                    "{} returned {} predictions for {} sentences (utterances {}..={}); leaving them unclassified",
                    classifier.name(),
                    predictions.len(),
                    batch.len(),
                    batch[0].index,
                    batch[batch.len() - 1].index
                );
                summary.failed_batches += 1;
            }
            Err(e) => {
                log::warn!(
                    "Emotion classification failed for utterances {}..={}: {}",
                    batch[0].index,
                    batch[batch.len() - 1].index,
                    e
                );
                summary.failed_batches += 1;
            }
        }
    }

    summary
}

/// Split every utterance into synthesis-sized chunks, in reading order.
pub fn plan_chunks(utterances: &[Utterance], max_chars: usize) -> Vec<SynthesisChunk> {
    utterances
        .iter()
        .flat_map(|u| SynthesisChunk::plan(u, max_chars))
        .collect()
}
