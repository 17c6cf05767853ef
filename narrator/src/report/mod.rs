//! Run report written next to the narrated output.

mod persistence;
mod types;

pub use persistence::{compute_book_hash, report_path, save_report};
pub use types::RunReport;
