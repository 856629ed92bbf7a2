//! Opening data files.

pub mod compression;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Open a vertex or edge file, decompressing it if needed.
///
/// # Errors
/// Fails if the file cannot be opened or its codec cannot start.
pub fn open_data_file(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    compression::auto_detect_reader(file, path)
        .with_context(|| format!("decompress {}", path.display()))
}

/// The label a data file loads into: its file name without any compression
/// extension and without its last remaining extension.
///
/// `data/person.csv.gz` yields `person`; `knows` yields `knows`.
#[must_use]
pub fn data_label(path: impl AsRef<Path>) -> Option<String> {
    let name = path.as_ref().file_name()?.to_str()?;
    let name = compression::strip_compression_extension(name);
    let label = match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    };
    (!label.is_empty()).then(|| label.to_string())
}
