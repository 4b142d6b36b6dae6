//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts depend on these values; never renumber an existing code.
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 2    | Usage error (bad or missing arguments)              |
//! | 3    | A source extract could not be read or lacks columns |
//! | 4    | Config file unreadable or invalid                   |
//! | 5    | Reconciliation failed (schema or pipeline error)    |
//! | 6    | Report workbook could not be written                |

use crossmatch_io::IoError;
use crossmatch_recon::ReconError;

/// Success - reconciliation ran and the report was written.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
/// clap uses the same code for its own parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Input error - source file missing, unreadable, or missing a mapped column.
pub const EXIT_INPUT: u8 = 3;

/// Config error - TOML parse failure or failed validation.
pub const EXIT_CONFIG: u8 = 4;

/// Reconciliation error - the pipeline hit a structural error.
pub const EXIT_RECON: u8 = 5;

/// Report error - the output workbook could not be created or saved.
pub const EXIT_REPORT: u8 = 6;

/// Map a reconciliation error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) | ReconError::Io(_) => EXIT_CONFIG,
        _ => EXIT_RECON,
    }
}

/// Map a loader/writer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Write(_) => EXIT_REPORT,
        IoError::Recon(e) => recon_exit_code(e),
        _ => EXIT_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_USAGE, EXIT_INPUT, EXIT_CONFIG, EXIT_RECON, EXIT_REPORT];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn io_errors_map_by_kind() {
        let missing = IoError::MissingColumn { file: "a.xlsx".into(), column: "Email".into() };
        assert_eq!(io_exit_code(&missing), EXIT_INPUT);
        assert_eq!(io_exit_code(&IoError::Write("disk full".into())), EXIT_REPORT);
        let nested = IoError::Recon(ReconError::FieldNotFound { field: "x".into() });
        assert_eq!(io_exit_code(&nested), EXIT_RECON);
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("bad".into())), EXIT_CONFIG);
    }
}
