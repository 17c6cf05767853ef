//! Format extraction: turn a book file into ordered raw text chunks.

mod epub;
mod markup;
mod mobi;
mod pdf;

use std::path::Path;

use crate::error::{PipelineError, Result};

#[cfg(test)]
pub(crate) use epub::fixtures;

/// An ordered text fragment as produced by a format extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Position in source reading order
    pub index: usize,
    /// Plain text content
    pub text: String,
}

impl RawChunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Epub,
    Pdf,
    Mobi,
    Azw3,
}

impl Format {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "epub" => Ok(Self::Epub),
            "pdf" => Ok(Self::Pdf),
            "mobi" => Ok(Self::Mobi),
            "azw3" => Ok(Self::Azw3),
            _ => Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Epub => "EPUB",
            Self::Pdf => "PDF",
            Self::Mobi => "MOBI",
            Self::Azw3 => "AZW3",
        }
    }
}

/// Extract the ordered RawChunks of a book.
///
/// Either every chunk is returned or an error is; there is no partial output.
pub fn extract_chunks(path: &Path) -> Result<Vec<RawChunk>> {
    let format = Format::from_path(path)?;

    match format {
        Format::Epub => epub::extract_epub(path),
        Format::Pdf => pdf::extract_pdf(path),
        Format::Mobi | Format::Azw3 => mobi::extract_mobi(path, format.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.epub")).unwrap(), Format::Epub);
        assert_eq!(Format::from_path(Path::new("B.PDF")).unwrap(), Format::Pdf);
        assert_eq!(Format::from_path(Path::new("c.mobi")).unwrap(), Format::Mobi);
        assert_eq!(Format::from_path(Path::new("d.AZW3")).unwrap(), Format::Azw3);
    }

    #[test]
    fn test_unsupported_format() {
        for name in ["notes.txt", "book.docx", "no_extension"] {
            match extract_chunks(Path::new(name)) {
                Err(PipelineError::UnsupportedFormat { path }) => {
                    assert_eq!(path, PathBuf::from(name))
                }
                other => panic!("expected UnsupportedFormat for {name}, got {other:?}"),
            }
        }
    }
}
