//! Testing utilities for graph loads.
//!
//! - **Fixtures**: a small person/knows schema and matching data files
//! - **Temporary data directories**: write (optionally compressed) data files
//!   that disappear when the test ends
//! - **Assertions**: compare the edges of a [`MemoryGraph`](crate::MemoryGraph)
//!   by endpoint key instead of internal ids
//!
//! # Quick Start
//!
//! ```no_run
//! use graphbeam::testing::*;
//! use graphbeam::{Importer, LoadOptions, MemoryGraph};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = TempDataDir::new()?;
//! let people = dir.write_lines("person.csv", &person_lines())?;
//!
//! let graph = MemoryGraph::new();
//! let mut importer = Importer::new(graph.clone(), LoadOptions::default())?;
//! importer.define_schema(&person_schema())?;
//! importer.load_vertices(&people)?;
//! assert_eq!(graph.vertex_count(), person_lines().len() - 1);
//! # Ok(())
//! # }
//! ```

mod assertions;
mod fixtures;
mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
