//! Data-quality diagnostics.
//!
//! Some bad input does not stop a load: a date that does not parse is left
//! out of its record, and an edge whose endpoint cannot be found is skipped.
//! Each such event becomes a [`Diagnostic`]. Workers collect them per
//! sub-batch; after a batch's workers are joined the importer logs them and
//! files them in a [`DiagnosticCollector`] for reporting.
//!
//! # Example
//!
//! ```
//! use graphbeam::diagnostics::{Diagnostic, DiagnosticCollector};
//!
//! let mut collector = DiagnosticCollector::new();
//! collector.add(Diagnostic::DateOmitted {
//!     file: "person.csv".into(),
//!     line: 7,
//!     property: "birthday".into(),
//!     value: "1990-13-45".into(),
//!     reason: "input is out of range".into(),
//! });
//! assert_eq!(collector.count(), 1);
//! assert_eq!(collector.date_omissions(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

/// Which side of an edge record failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Out,
    In,
    Both,
}

/// A recoverable data-quality event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A date value did not parse; the property was left unset.
    DateOmitted {
        file: String,
        line: u64,
        property: String,
        value: String,
        reason: String,
    },
    /// An edge endpoint was not found; the record was skipped.
    EndpointMissing {
        file: String,
        line: u64,
        label: String,
        out_key: String,
        out_value: String,
        in_key: String,
        in_value: String,
        missing: Endpoint,
    },
}

impl Diagnostic {
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::DateOmitted { file, .. } | Self::EndpointMissing { file, .. } => file,
        }
    }

    #[must_use]
    pub fn line(&self) -> u64 {
        match self {
            Self::DateOmitted { line, .. } | Self::EndpointMissing { line, .. } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateOmitted {
                file,
                line,
                property,
                value,
                reason,
            } => write!(
                f,
                "{file}:{line}: date '{value}' for '{property}' omitted ({reason})"
            ),
            Self::EndpointMissing {
                file,
                line,
                label,
                out_key,
                out_value,
                in_key,
                in_value,
                ..
            } => write!(
                f,
                "{file}:{line}: vertex not found: {out_key}={out_value} -{label}-> {in_key}={in_value}"
            ),
        }
    }
}

/// Accumulates diagnostics for a whole run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of omitted date values.
    #[must_use]
    pub fn date_omissions(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::DateOmitted { .. }))
            .count()
    }

    /// Number of edge records skipped for a missing endpoint.
    #[must_use]
    pub fn missing_endpoints(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::EndpointMissing { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Print every diagnostic to stderr.
    pub fn print(&self) {
        for d in &self.diagnostics {
            eprintln!("{d}");
        }
    }

    /// Export diagnostics as a JSON array.
    ///
    /// # Errors
    /// Serialization failures from `serde_json`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.diagnostics)
    }

    /// Write diagnostics to `path` as JSON.
    ///
    /// # Errors
    /// Serialization or file I/O failures.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl fmt::Display for DiagnosticCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagnosticCollector({} diagnostics)", self.count())
    }
}
