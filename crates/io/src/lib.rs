//! `crossmatch-io` — reading source extracts and writing the report workbook.

pub mod csv;
pub mod error;
pub mod loader;
pub mod report;
pub mod xlsx;

pub use error::IoError;
pub use loader::{load_source, load_sources};
pub use report::write_report;
