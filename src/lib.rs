//! # Graphbeam
//!
//! A **bulk loader for property graphs**. Graphbeam reads `|`-delimited vertex
//! and edge files, coerces every column through a typed schema and writes the
//! records into a graph store from a pool of parallel workers, each committing
//! its share of a batch in one transaction that is replayed on conflict.
//!
//! ## Key Features
//!
//! - **Typed schema** - text, boolean, integer, long and date properties, single
//!   or list valued, with composite indexes for key lookups
//! - **Parallel batches** - each batch is split into contiguous sub-batches, one
//!   per worker, with a join barrier between batches
//! - **Bounded retry** - a conflicting sub-batch is replayed in full, never
//!   partially applied, up to a configurable ceiling
//! - **Tolerant edges** - records whose endpoints are missing are skipped and
//!   reported as diagnostics instead of failing the load
//! - **Compressed input** - gzip, zstd, bzip2 and xz files are read transparently
//!   (all optional via feature flags)
//! - **Pluggable stores** - implement [`GraphStore`] for your database;
//!   [`MemoryGraph`] ships as the in-process reference store
//!
//! ## Quick Start
//!
//! ```no_run
//! use graphbeam::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let schema = Schema::new()
//!     .vertex_label("person")
//!     .edge_label("knows")
//!     .property("id", SemanticType::Long, Cardinality::Single)
//!     .property("name", SemanticType::Text, Cardinality::Single)
//!     .property("email", SemanticType::Text, Cardinality::List)
//!     .indexed("id");
//!
//! let mut importer = Importer::new(MemoryGraph::new(), LoadOptions::default())?;
//! importer.define_schema(&schema)?;
//! importer.load_vertices("data/person.csv")?;
//! importer.load_edges("data/knows.csv", &EdgeOptions::default())?;
//! importer.close_connection()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## File Format
//!
//! The first line is the header; every further line is one record:
//!
//! ```text
//! id|name|email
//! 1|Ann|a@x.com;a2@x.com
//! ```
//!
//! - List properties pack their values with `;`.
//! - Dates are `YYYY-MM-DD`, loaded as midnight UTC.
//! - Empty columns leave the property unset.
//! - The file name without extensions is the label (`person.csv.gz` loads
//!   `person` vertices).
//! - In edge files the first two columns are the endpoint keys (`id1|id2`), looked up
//!   on the indexed vertex property they name.
//!
//! ## Module Overview
//!
//! - [`importer`] - The facade: schema, connection lifecycle, per-file batch loop
//! - [`schema`] / [`coerce`] - Property types and value coercion
//! - [`record`] / [`partition`] - Parsing and splitting work across workers
//! - [`worker`] / [`retry`] - Sub-batch transactions and their retry loop
//! - [`store`] - The graph store capability and the in-memory store
//! - [`config`] - Load options and JSON import jobs
//! - [`diagnostics`] / [`metrics`] / [`progress`] - What happened during a load
//! - [`io`] - Opening (compressed) data files
//! - [`testing`] - Fixtures and helpers for tests

pub mod coerce;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod importer;
pub mod io;
pub mod metrics;
pub mod partition;
pub mod progress;
pub mod record;
pub mod retry;
pub mod schema;
pub mod store;
pub mod testing;
pub mod worker;

pub use coerce::{Coercion, TypedPropertySet, TypedValue, coerce};
pub use config::{EdgeOptions, ImportJob, LoadOptions};
pub use diagnostics::{Diagnostic, DiagnosticCollector};
pub use error::LoadError;
pub use importer::{FileReport, Importer};
pub use metrics::MetricsCollector;
pub use schema::{Cardinality, PropertySpec, Schema, SemanticType};
pub use store::{GraphStore, MemoryGraph, SchemaManagement, StoreError, Transaction};
