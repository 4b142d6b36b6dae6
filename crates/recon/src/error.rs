use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// A requested field is absent from a record set's schema.
    FieldNotFound { field: String },
    /// Concatenation of record sets with differing schemas.
    SchemaMismatch { left: String, right: String },
    /// A schema would contain the same qualified field twice.
    DuplicateField { field: String },
    /// A record's width does not match its schema.
    RowWidth { expected: usize, found: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty alias, etc.).
    ConfigValidation(String),
    /// IO error (config file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound { field } => write!(f, "field not found: '{field}'"),
            Self::SchemaMismatch { left, right } => {
                write!(f, "schema mismatch: [{left}] vs [{right}]")
            }
            Self::DuplicateField { field } => write!(f, "duplicate field: '{field}'"),
            Self::RowWidth { expected, found } => {
                write!(f, "record has {found} value(s), schema has {expected} field(s)")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
