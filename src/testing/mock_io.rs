//! Temporary data files for tests.

use crate::io::compression::auto_detect_writer;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory of data files, deleted when dropped.
pub struct TempDataDir {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDataDir {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Write `lines` to `filename`, one per line. A compression extension
    /// (`.gz`, `.zst`, ...) compresses the file with the matching codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_lines<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> Result<PathBuf> {
        let path = self.file_path(filename);
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        let mut writer = auto_detect_writer(file, &path)?;
        for line in lines {
            writeln!(writer, "{}", line.as_ref())?;
        }
        writer.flush()?;
        drop(writer);
        Ok(path)
    }

    /// Write raw text to `filename` without any compression.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_text(&self, filename: &str, text: &str) -> std::io::Result<PathBuf> {
        let path = self.file_path(filename);
        std::fs::write(&path, text)?;
        Ok(path)
    }
}

impl Default for TempDataDir {
    fn default() -> Self {
        Self::new().expect("Failed to create temporary directory")
    }
}
