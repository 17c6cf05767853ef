//! Errors that abort a book before any artifact is produced.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to extract {format} text from {}: {message}", path.display())]
    Extraction {
        format: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Sentence segmentation failed: {0}")]
    Segmentation(String),

    #[error("Invalid boundary pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl PipelineError {
    pub fn extraction(
        format: &'static str,
        path: impl Into<PathBuf>,
        message: impl ToString,
    ) -> Self {
        Self::Extraction {
            format,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
