use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::RawChunk;
use crate::error::{PipelineError, Result};

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// Extract positioned text blocks page by page, in reading order.
///
/// Text is extracted one page at a time; blocks are runs of lines separated
/// by blank lines. Each block becomes one RawChunk with
/// its line breaks collapsed to spaces.
pub fn extract_pdf(path: &Path) -> Result<Vec<RawChunk>> {
    log::info!("Extracting text from PDF: {}", path.display());

    // pdf-extract panics on some malformed content streams
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path))
        .map_err(|_| PipelineError::extraction("PDF", path, "parser panicked on malformed PDF"))?
        .map_err(|e| PipelineError::extraction("PDF", path, e))?;

    if pages.iter().all(|page| page.trim().is_empty()) {
        return Err(PipelineError::extraction(
            "PDF",
            path,
            "no extractable text (the PDF may be scanned and need OCR)",
        ));
    }

    let chunks = blocks_from_pages(&pages);

    log::info!(
        "Extracted {} blocks from {} PDF pages",
        chunks.len(),
        pages.len()
    );
    Ok(chunks)
}

fn blocks_from_pages<S: AsRef<str>>(pages: &[S]) -> Vec<RawChunk> {
    let mut chunks = Vec::new();

    for page in pages {
        for block in BLANK_LINE.split(page.as_ref()) {
            let collapsed = block.replace(['\r', '\n'], " ");
            let collapsed = collapsed.trim();
            if !collapsed.is_empty() {
                chunks.push(RawChunk::new(chunks.len(), collapsed));
            }
        }
    }

    chunks
}
