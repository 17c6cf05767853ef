//! Run report data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::synthesis::{UnitOutcome, UnitResult};

/// A chunk the synthesis engine could not render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub utterance_index: usize,
    pub chunk_index: usize,
    pub text: String,
    pub reason: String,
}

/// Record of one run over one book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Path to the source book
    pub book_path: PathBuf,
    /// SHA256 hash of the book (first 1MB)
    pub book_hash: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Utterances sent to synthesis
    pub utterances: usize,
    /// Utterances the classifier labelled
    pub classified: usize,
    /// Synthesis chunks planned
    pub chunks: usize,
    /// Chunks rendered to audio
    pub rendered: usize,
    /// Total length of rendered chunks, before silence gaps
    pub rendered_ms: u64,
    pub skipped: Vec<SkippedUnit>,
    pub output_path: Option<PathBuf>,
    pub duration_ms: Option<u64>,
}

impl RunReport {
    pub fn new(book_path: PathBuf, book_hash: String) -> Self {
        Self {
            book_path,
            book_hash,
            started_at: Utc::now(),
            finished_at: None,
            utterances: 0,
            classified: 0,
            chunks: 0,
            rendered: 0,
            rendered_ms: 0,
            skipped: Vec::new(),
            output_path: None,
            duration_ms: None,
        }
    }

    /// Tally synthesis outcomes.
    pub fn record_results(&mut self, results: &[UnitResult]) {
        self.chunks = results.len();
        self.rendered = results.iter().filter(|r| r.is_rendered()).count();
        self.rendered_ms = results
            .iter()
            .filter_map(|r| match &r.outcome {
                UnitOutcome::Rendered { duration_ms, .. } => Some(*duration_ms),
                _ => None,
            })
            .sum();
        self.skipped = results
            .iter()
            .filter_map(|r| match &r.outcome {
                UnitOutcome::Skipped { reason } => Some(SkippedUnit {
                    utterance_index: r.chunk.utterance_index,
                    chunk_index: r.chunk.chunk_index,
                    text: r.chunk.text.clone(),
                    reason: reason.clone(),
                }),
                UnitOutcome::Rendered { .. } => None,
            })
            .collect();
    }

    /// Stamp the finish time and the produced artifact.
    pub fn finish(&mut self, output_path: Option<PathBuf>, duration_ms: Option<u64>) {
        self.output_path = output_path;
        self.duration_ms = duration_ms;
        self.finished_at = Some(Utc::now());
    }
}
