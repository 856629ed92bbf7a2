//! Error types for the loader.
//!
//! [`LoadError`] is the typed taxonomy raised by coercion, parsing and the
//! loader workers. The [`Importer`](crate::Importer) facade wraps it in
//! [`anyhow::Error`] with file context; callers that need to branch on the
//! failure kind can recover it with `err.downcast_ref::<LoadError>()`.

use crate::schema::SemanticType;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// A column names a property with no registered semantic type.
    #[error("unsupported type: property '{property}' is not registered in the schema")]
    UnsupportedType { property: String },

    /// A non-date value could not be parsed as its declared type.
    #[error("line {line}: cannot parse '{value}' as {expected:?} for property '{property}'")]
    InvalidValue {
        line: u64,
        property: String,
        value: String,
        expected: SemanticType,
    },

    /// A data line has more fields than the header has columns.
    #[error("line {line}: expected at most {expected} columns, found {found}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// An edge file's endpoint column cannot be mapped to a vertex key property.
    #[error("edge column '{column}' does not map to a registered vertex key property")]
    UnresolvedEndpointKey { column: String },

    /// A sub-batch transaction kept failing past the retry ceiling.
    #[error(
        "transaction failed {failures} times (file {file}, lines [{first_line},{last_line}]), aborting"
    )]
    RetriesExhausted {
        failures: u32,
        file: String,
        first_line: u64,
        last_line: u64,
    },

    #[error("graph store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LoadError {
    /// Attach a file line to an [`InvalidValue`](Self::InvalidValue); other
    /// variants pass through unchanged.
    #[must_use]
    pub fn at_line(self, line: u64) -> Self {
        match self {
            Self::InvalidValue {
                property,
                value,
                expected,
                ..
            } => Self::InvalidValue {
                line,
                property,
                value,
                expected,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
