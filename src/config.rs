//! Load configuration.
//!
//! [`LoadOptions`] tunes the batch engine, [`EdgeOptions`] maps edge files to
//! labels and endpoint columns to vertex keys, and [`ImportJob`] bundles a
//! schema with the files to load. All of them deserialize from JSON; missing
//! fields take their defaults.
//!
//! ```
//! use graphbeam::config::ImportJob;
//!
//! let job: ImportJob = serde_json::from_str(r#"{
//!     "schema": {
//!         "vertex_labels": ["person"],
//!         "edge_labels": ["knows"],
//!         "properties": { "id": { "type": "long" } },
//!         "indexed": ["id"]
//!     },
//!     "options": { "batch_size": 500, "undirected": true },
//!     "vertex_files": ["data/person.csv"],
//!     "edge_files": ["data/knows.csv"]
//! }"#).unwrap();
//!
//! assert_eq!(job.options.batch_size, 500);
//! assert_eq!(job.options.max_retries, 1000);
//! assert!(!job.clear);
//! ```

use crate::retry::DEFAULT_MAX_RETRIES;
use crate::schema::Schema;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 20_000;
pub const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 10;

/// Tuning of the batch engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Records pulled from a file per read cycle.
    pub batch_size: usize,
    /// Workers per batch; also the size of the importer's thread pool.
    pub thread_count: usize,
    /// Seconds between periodic progress lines.
    pub progress_interval_secs: u64,
    /// Failed commits tolerated per sub-batch before the load is aborted.
    pub max_retries: u32,
    /// Create the reverse of every loaded edge as well.
    pub undirected: bool,
    /// Print periodic progress lines. The closing line of a file is always
    /// printed.
    pub print_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            thread_count: num_cpus::get(),
            progress_interval_secs: DEFAULT_PROGRESS_INTERVAL_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            undirected: false,
            print_progress: true,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    /// Reject settings the engine cannot run with.
    ///
    /// # Errors
    /// A zero batch size, thread count or progress interval.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.thread_count > 0, "thread_count must be at least 1");
        ensure!(
            self.progress_interval_secs > 0,
            "progress_interval_secs must be at least 1"
        );
        Ok(())
    }
}

/// How edge files map onto labels and endpoint keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeOptions {
    /// File base name → edge label, for files not named after their label.
    pub labels: BTreeMap<String, String>,
    /// Endpoint column name → vertex property used for the lookup.
    pub endpoint_keys: BTreeMap<String, String>,
}

impl EdgeOptions {
    #[must_use]
    pub fn with_label(mut self, file_base: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(file_base.into(), label.into());
        self
    }

    #[must_use]
    pub fn with_endpoint_key(mut self, column: impl Into<String>, key: impl Into<String>) -> Self {
        self.endpoint_keys.insert(column.into(), key.into());
        self
    }

    /// Label for a file whose base name is `file_base`.
    #[must_use]
    pub fn label_for<'a>(&'a self, file_base: &'a str) -> &'a str {
        self.labels.get(file_base).map_or(file_base, String::as_str)
    }
}

/// A complete load: schema, options and the files to ingest.
///
/// Vertex files are loaded in order before any edge file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub schema: Schema,
    #[serde(default)]
    pub options: LoadOptions,
    #[serde(default)]
    pub edges: EdgeOptions,
    #[serde(default)]
    pub vertex_files: Vec<PathBuf>,
    #[serde(default)]
    pub edge_files: Vec<PathBuf>,
    /// Wipe the graph before loading.
    #[serde(default)]
    pub clear: bool,
}

impl ImportJob {
    /// Read a job from a JSON file. Relative data paths are resolved against
    /// the directory holding the job file.
    ///
    /// # Errors
    /// I/O and JSON errors, with the path as context.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("read job {}", path.display()))?;
        let mut job: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse job {}", path.display()))?;
        if let Some(base) = path.parent() {
            job.resolve_paths(base);
        }
        Ok(job)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for file in self.vertex_files.iter_mut().chain(self.edge_files.iter_mut()) {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_rejected() {
        let options = LoadOptions {
            thread_count: 0,
            ..LoadOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(LoadOptions::default().validate().is_ok());
    }

    #[test]
    fn label_override_falls_back_to_base_name() {
        let edges = EdgeOptions::default().with_label("knowsFile", "knows");
        assert_eq!(edges.label_for("knowsFile"), "knows");
        assert_eq!(edges.label_for("likes"), "likes");
    }
}
