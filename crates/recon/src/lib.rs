//! `crossmatch-recon` — cascading account/contact reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded record sets, returns the matched
//! reports. No CLI or spreadsheet IO dependencies.

pub mod annotate;
pub mod config;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod matcher;
pub mod model;
pub mod schema;
pub mod sources;
pub mod summary;
pub mod table;

pub use config::MatchConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{FieldName, ReconInput, ReconResult, Record, Value};
pub use table::RecordSet;
