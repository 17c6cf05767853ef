use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::RawChunk;
use super::markup::{decode_entities, join_words, strip_tags};
use crate::error::{PipelineError, Result};

/// Section separator Mobipocket writers place between book parts.
static PAGE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<mbp:pagebreak\b[^>]*>").unwrap());

/// Extract MOBI/AZW3 text records as one RawChunk per section.
pub fn extract_mobi(path: &Path, format: &'static str) -> Result<Vec<RawChunk>> {
    log::info!("Extracting text from {}: {}", format, path.display());

    let content = std::panic::catch_unwind(|| {
        mobi::Mobi::from_path(path)
            .map(|book| book.content_as_string_lossy())
            .map_err(|e| e.to_string())
    })
    .map_err(|_| PipelineError::extraction(format, path, "decoder panicked on malformed records"))?
    .map_err(|e| PipelineError::extraction(format, path, e))?;

    let chunks = sections_from_markup(&content);
    if chunks.is_empty() {
        return Err(PipelineError::extraction(format, path, "no readable text records"));
    }

    log::info!("Extracted {} sections from {}", chunks.len(), format);
    Ok(chunks)
}

fn sections_from_markup(content: &str) -> Vec<RawChunk> {
    let mut chunks = Vec::new();

    for section in PAGE_BREAK.split(content) {
        let text = join_words(&decode_entities(&strip_tags(section)));
        if !text.is_empty() {
            chunks.push(RawChunk::new(chunks.len(), text));
        }
    }

    chunks
}
