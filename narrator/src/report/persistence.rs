//! Report persistence and book fingerprinting.

use super::types::RunReport;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Compute a short hash of the book file.
///
/// Uses SHA256 of the first 1MB for speed with large files.
pub fn compute_book_hash(book_path: &Path) -> Result<String> {
    let file = File::open(book_path).context("Failed to open book file for hashing")?;
    let mut reader = BufReader::new(file).take(1024 * 1024);

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let mut hasher = Sha256::new();
    hasher.update(&buffer);
    let result = hasher.finalize();

    // Return first 16 hex characters
    Ok(format!("{:x}", result)[..16].to_string())
}

/// Report location for an output file: `<output>.report.json`
pub fn report_path(output_path: &Path) -> PathBuf {
    let mut path = output_path.as_os_str().to_owned();
    path.push(".report.json");
    PathBuf::from(path)
}

/// Write the report as pretty JSON.
pub fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
