//! Narrative structuring: decide which extracted chunks are story text.

mod boundary;
mod content_filter;

pub use boundary::NarrativeBoundary;
pub use content_filter::ContentFilter;

use crate::ingest::RawChunk;

/// Join chunks into one narrative string, separated by single spaces.
pub fn join_chunks(chunks: &[RawChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
