use std::fmt;

use crossmatch_recon::ReconError;

/// Errors raised while reading sources or writing the report.
#[derive(Debug, Clone, PartialEq)]
pub enum IoError {
    /// The file could not be opened or read.
    Open { path: String, message: String },
    /// The workbook has no worksheet, or the sheet has no header row.
    EmptyWorkbook { path: String },
    /// A source column named in the schema is absent from the header row.
    MissingColumn { file: String, column: String },
    Csv(String),
    Write(String),
    Recon(ReconError),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => write!(f, "cannot open '{path}': {message}"),
            Self::EmptyWorkbook { path } => write!(f, "'{path}' has no worksheet data"),
            Self::MissingColumn { file, column } => {
                write!(f, "'{file}' has no column '{column}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Write(msg) => write!(f, "report write error: {msg}"),
            Self::Recon(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Recon(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReconError> for IoError {
    fn from(e: ReconError) -> Self {
        IoError::Recon(e)
    }
}
