//! The importer facade.
//!
//! An [`Importer`] owns a graph store, the load options and a worker pool. It
//! declares the schema, manages the store connection and drives every data
//! file through the same cycle:
//!
//! ```text
//! read batch -> split into sub-batches -> one worker per sub-batch (pool)
//!            -> join all workers -> aggregate reports -> progress -> next batch
//! ```
//!
//! No sub-batch of batch `N + 1` starts before every worker of batch `N` has
//! finished. When a worker fails, its siblings still run to completion; the
//! first failure (in worker order) is returned after the join.

use crate::config::{EdgeOptions, ImportJob, LoadOptions};
use crate::diagnostics::DiagnosticCollector;
use crate::error::{LoadError, Result as LoadResult};
use crate::io::{data_label, open_data_file};
use crate::metrics::{
    EDGES_CREATED, GaugeMetric, MetricsCollector, RECORDS_READ, RECORDS_SKIPPED, TX_COMMITS,
    TX_CONFLICTS, VALUES_OMITTED, VERTICES_CREATED,
};
use crate::partition::{SubBatch, partition};
use crate::progress::ProgressReporter;
use crate::record::RecordReader;
use crate::schema::Schema;
use crate::store::{GraphStore, Multiplicity, SchemaManagement};
use crate::worker::{EdgeLoader, SubBatchReport, VertexLoader};
use anyhow::{Context, Result, anyhow, bail};
use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Totals for one loaded file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub label: String,
    pub records: u64,
    pub batches: u64,
    pub vertices_created: u64,
    pub edges_created: u64,
    pub records_skipped: u64,
    pub values_omitted: u64,
    /// Committed sub-batch transactions.
    pub commits: u64,
    /// Failed commits that were replayed.
    pub conflicts: u64,
}

impl FileReport {
    fn new(file: &str, label: &str) -> Self {
        Self {
            file: file.to_string(),
            label: label.to_string(),
            ..Self::default()
        }
    }

    fn absorb(&mut self, report: &SubBatchReport) {
        self.records += report.records as u64;
        self.vertices_created += report.vertices_created as u64;
        self.edges_created += report.edges_created as u64;
        self.records_skipped += report.records_skipped as u64;
        self.values_omitted += report.values_omitted as u64;
        self.conflicts += u64::from(report.conflicts);
        if report.records > 0 {
            self.commits += 1;
        }
    }
}

/// Loads delimited vertex and edge files into a [`GraphStore`].
///
/// # Example
///
/// ```
/// use graphbeam::testing::{TempDataDir, knows_lines, person_lines, person_schema};
/// use graphbeam::{EdgeOptions, Importer, LoadOptions, MemoryGraph};
///
/// # fn main() -> anyhow::Result<()> {
/// let dir = TempDataDir::new()?;
/// let people = dir.write_lines("person.csv", &person_lines())?;
/// let knows = dir.write_lines("knows.csv", &knows_lines())?;
///
/// let graph = MemoryGraph::new();
/// let options = LoadOptions { print_progress: false, ..LoadOptions::default() };
/// let mut importer = Importer::new(graph.clone(), options)?;
/// importer.define_schema(&person_schema())?;
/// importer.load_vertices(&people)?;
/// let report = importer.load_edges(&knows, &EdgeOptions::default())?;
///
/// assert_eq!(report.edges_created, 2);
/// assert_eq!(graph.edge_count(), 2);
/// # Ok(())
/// # }
/// ```
pub struct Importer<S: GraphStore> {
    store: S,
    options: LoadOptions,
    schema: Option<Schema>,
    pool: ThreadPool,
    metrics: MetricsCollector,
    diagnostics: DiagnosticCollector,
}

impl<S: GraphStore> Importer<S> {
    /// Build an importer with a pool of `options.thread_count` workers.
    ///
    /// # Errors
    /// Invalid options, or the pool cannot be started.
    pub fn new(store: S, options: LoadOptions) -> Result<Self> {
        options.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.thread_count)
            .thread_name(|i| format!("graphbeam-worker-{i}"))
            .build()
            .context("start worker pool")?;
        Ok(Self {
            store,
            options,
            schema: None,
            pool,
            metrics: MetricsCollector::new(),
            diagnostics: DiagnosticCollector::new(),
        })
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// The schema declared by the last [`define_schema`](Self::define_schema).
    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    /// Open the store connection; a no-op if it is already open.
    ///
    /// # Errors
    /// Store failures.
    pub fn open_connection(&self) -> Result<()> {
        if !self.store.is_open() {
            self.store.open().context("open graph store")?;
            info!("graph store opened");
        }
        Ok(())
    }

    /// Close the store connection; a no-op if it is already closed.
    ///
    /// # Errors
    /// Store failures.
    pub fn close_connection(&self) -> Result<()> {
        if !self.store.is_closed() {
            self.store.close().context("close graph store")?;
            info!("graph store closed");
        }
        Ok(())
    }

    /// Close the connection, wipe all data and schema, and reopen.
    ///
    /// # Errors
    /// Store failures.
    pub fn clear_graph(&mut self) -> Result<()> {
        self.close_connection()?;
        self.store.clear().context("clear graph store")?;
        info!("graph store cleared");
        self.open_connection()
    }

    /// Declare labels, property keys and indexes, skipping whatever the store
    /// already has. Each element is declared in its own management session.
    ///
    /// # Errors
    /// Store failures, e.g. an index over an undeclared property.
    pub fn define_schema(&mut self, schema: &Schema) -> Result<()> {
        self.open_connection()?;

        for label in &schema.vertex_labels {
            self.declare(&format!("vertex label {label}"), |m| {
                if m.contains_vertex_label(label) {
                    return Ok(false);
                }
                m.make_vertex_label(label)?;
                Ok(true)
            })?;
        }
        for label in &schema.edge_labels {
            self.declare(&format!("edge label {label}"), |m| {
                if m.contains_edge_label(label) {
                    return Ok(false);
                }
                m.make_edge_label(label, Multiplicity::Simple)?;
                Ok(true)
            })?;
        }
        for (name, spec) in &schema.properties {
            self.declare(&format!("property key {name}"), |m| {
                if m.contains_property_key(name) {
                    return Ok(false);
                }
                m.make_property_key(name, spec.semantic_type, spec.cardinality)?;
                Ok(true)
            })?;
        }
        for property in &schema.indexed {
            let index = schema.index_name(property);
            self.declare(&format!("index {index}"), |m| {
                if m.contains_index(&index) {
                    return Ok(false);
                }
                m.build_composite_index(&index, property)?;
                Ok(true)
            })?;
        }

        self.schema = Some(schema.clone());
        Ok(())
    }

    fn declare<F>(&self, what: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut S::Management) -> std::result::Result<bool, crate::store::StoreError>,
    {
        let mut management = self.store.open_management().context("open schema management")?;
        if edit(&mut management).with_context(|| format!("define {what}"))? {
            management
                .commit()
                .with_context(|| format!("commit {what}"))?;
            info!("defined {what}");
        } else {
            debug!("{what} already defined");
        }
        Ok(())
    }

    /// Load every record of a vertex file, one vertex per record. The label is
    /// the file's base name.
    ///
    /// # Errors
    /// I/O and parse failures, unregistered columns, invalid values, store
    /// errors and retry exhaustion. The typed cause is a [`LoadError`] where
    /// one applies.
    pub fn load_vertices(&mut self, path: impl AsRef<Path>) -> Result<FileReport> {
        let path = path.as_ref();
        let schema = require_schema(self.schema.as_ref())?;
        let label = data_label(path)
            .ok_or_else(|| anyhow!("cannot derive a label from {}", path.display()))?;
        let file = path.display().to_string();

        let reader = open_reader(path)?;
        let header = reader.header().clone();
        for column in header.columns() {
            schema
                .require(column)
                .with_context(|| format!("header of {file}"))?;
        }

        info!(file = %file, label = %label, "loading vertices");
        let loader = VertexLoader {
            store: &self.store,
            schema,
            header: &header,
            label: &label,
            file: &file,
            max_retries: self.options.max_retries,
        };
        let mut run = BatchRun {
            pool: &self.pool,
            options: &self.options,
            metrics: &self.metrics,
            diagnostics: &mut self.diagnostics,
        };
        let report = run
            .drive(reader, FileReport::new(&file, &label), |sub| loader.load(sub))
            .with_context(|| format!("load vertices from {file}"))?;
        info!(
            file = %file,
            records = report.records,
            vertices = report.vertices_created,
            conflicts = report.conflicts,
            "vertices loaded"
        );
        Ok(report)
    }

    /// Load every record of an edge file. Columns 0 and 1 are the endpoint
    /// keys; the rest are edge properties. The label is the base name, unless
    /// `edges` maps it to another label.
    ///
    /// # Errors
    /// As for [`load_vertices`](Self::load_vertices), plus
    /// [`LoadError::UnresolvedEndpointKey`] for endpoint columns that map to no
    /// vertex property.
    pub fn load_edges(&mut self, path: impl AsRef<Path>, edges: &EdgeOptions) -> Result<FileReport> {
        let path = path.as_ref();
        let schema = require_schema(self.schema.as_ref())?;
        let base = data_label(path)
            .ok_or_else(|| anyhow!("cannot derive a label from {}", path.display()))?;
        let label = edges.label_for(&base).to_string();
        let file = path.display().to_string();

        let reader = open_reader(path)?;
        let header = reader.header().clone();
        if header.len() < 2 {
            bail!(
                "edge file {file} needs two endpoint columns, header has {}",
                header.len()
            );
        }
        let columns = header.columns();
        let out_key = endpoint_key(schema, edges, &columns[0])?;
        let in_key = endpoint_key(schema, edges, &columns[1])?;
        for column in &columns[2..] {
            schema
                .require(column)
                .with_context(|| format!("header of {file}"))?;
        }
        for key in [&out_key, &in_key] {
            if !schema.is_indexed(key) {
                warn!(file = %file, key = %key, "endpoint key is not indexed");
            }
        }

        info!(file = %file, label = %label, out_key = %out_key, in_key = %in_key, "loading edges");
        let loader = EdgeLoader {
            store: &self.store,
            schema,
            header: &header,
            label: &label,
            file: &file,
            out_key: &out_key,
            in_key: &in_key,
            undirected: self.options.undirected,
            max_retries: self.options.max_retries,
        };
        let mut run = BatchRun {
            pool: &self.pool,
            options: &self.options,
            metrics: &self.metrics,
            diagnostics: &mut self.diagnostics,
        };
        let report = run
            .drive(reader, FileReport::new(&file, &label), |sub| loader.load(sub))
            .with_context(|| format!("load edges from {file}"))?;
        info!(
            file = %file,
            records = report.records,
            edges = report.edges_created,
            skipped = report.records_skipped,
            conflicts = report.conflicts,
            "edges loaded"
        );
        Ok(report)
    }

    /// Run a whole job: optional clear, schema, every vertex file, then every
    /// edge file. The connection is closed if any step fails.
    ///
    /// # Errors
    /// The first failing step.
    pub fn import(&mut self, job: &ImportJob) -> Result<Vec<FileReport>> {
        let result = self.run_job(job);
        if result.is_err()
            && let Err(e) = self.close_connection()
        {
            warn!("closing graph store after failed import: {e:#}");
        }
        result
    }

    fn run_job(&mut self, job: &ImportJob) -> Result<Vec<FileReport>> {
        if job.clear {
            self.clear_graph()?;
        }
        self.define_schema(&job.schema)?;
        let mut reports = Vec::with_capacity(job.vertex_files.len() + job.edge_files.len());
        for path in &job.vertex_files {
            reports.push(self.load_vertices(path)?);
        }
        for path in &job.edge_files {
            reports.push(self.load_edges(path, &job.edges)?);
        }
        Ok(reports)
    }
}

fn require_schema(schema: Option<&Schema>) -> Result<&Schema> {
    schema.ok_or_else(|| anyhow!("no schema defined; call define_schema first"))
}

fn open_reader(path: &Path) -> Result<RecordReader<Box<dyn Read>>> {
    let input = open_data_file(path)?;
    RecordReader::new(input).with_context(|| format!("read header of {}", path.display()))
}

/// Vertex property an edge endpoint column looks up: the column itself when
/// it is a registered property, else an explicit override, else the column
/// without its trailing digits (`id1` -> `id`).
///
/// # Errors
/// [`LoadError::UnresolvedEndpointKey`] when none of these is registered.
pub fn endpoint_key(schema: &Schema, edges: &EdgeOptions, column: &str) -> LoadResult<String> {
    if schema.spec(column).is_some() {
        return Ok(column.to_string());
    }
    if let Some(key) = edges.endpoint_keys.get(column) {
        if schema.spec(key).is_some() {
            return Ok(key.clone());
        }
        return Err(LoadError::UnresolvedEndpointKey {
            column: column.to_string(),
        });
    }
    let stripped = column.trim_end_matches(|c: char| c.is_ascii_digit());
    if !stripped.is_empty() && stripped != column && schema.spec(stripped).is_some() {
        return Ok(stripped.to_string());
    }
    Err(LoadError::UnresolvedEndpointKey {
        column: column.to_string(),
    })
}

/// Shared state of one file's batch loop, borrowed from the importer.
struct BatchRun<'a> {
    pool: &'a ThreadPool,
    options: &'a LoadOptions,
    metrics: &'a MetricsCollector,
    diagnostics: &'a mut DiagnosticCollector,
}

impl BatchRun<'_> {
    fn drive<R, F>(
        &mut self,
        reader: RecordReader<R>,
        mut report: FileReport,
        load: F,
    ) -> Result<FileReport>
    where
        R: Read,
        F: Fn(&SubBatch) -> LoadResult<SubBatchReport> + Sync,
    {
        self.metrics.record_start();
        let mut progress =
            ProgressReporter::new(self.options.progress_interval(), self.options.print_progress);

        let batches = partition(reader, self.options.batch_size, self.options.thread_count);
        for subs in batches {
            let subs = subs?;
            let results: Vec<LoadResult<SubBatchReport>> = self.pool.install(|| {
                subs.par_iter()
                    .with_max_len(1)
                    .map(|sub| load(sub))
                    .collect()
            });
            report.batches += 1;

            let mut first_error = None;
            for result in results {
                match result {
                    Ok(sub) => self.absorb(&mut report, sub),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            if let Some(e) = first_error {
                self.metrics.record_end();
                return Err(e.into());
            }
            progress.observe(report.records);
        }

        progress.finish(report.records);
        self.metrics.record_end();
        if let Some(elapsed) = self.metrics.elapsed()
            && elapsed.as_secs_f64() > 0.0
        {
            let rate = self.metrics.counter(RECORDS_READ) as f64 / elapsed.as_secs_f64();
            self.metrics.register(Box::new(
                GaugeMetric::new("records_per_second", rate)
                    .with_description("Records loaded per second of wall-clock time"),
            ));
        }
        Ok(report)
    }

    fn absorb(&mut self, report: &mut FileReport, sub: SubBatchReport) {
        debug!(
            worker = sub.worker,
            records = sub.records,
            conflicts = sub.conflicts,
            "sub-batch committed"
        );
        report.absorb(&sub);

        self.metrics.increment_counter(RECORDS_READ, sub.records as u64);
        self.metrics
            .increment_counter(VERTICES_CREATED, sub.vertices_created as u64);
        self.metrics
            .increment_counter(EDGES_CREATED, sub.edges_created as u64);
        self.metrics
            .increment_counter(RECORDS_SKIPPED, sub.records_skipped as u64);
        self.metrics
            .increment_counter(VALUES_OMITTED, sub.values_omitted as u64);
        self.metrics
            .increment_counter(TX_CONFLICTS, u64::from(sub.conflicts));
        if sub.records > 0 {
            self.metrics.increment_counter(TX_COMMITS, 1);
        }

        for diagnostic in &sub.diagnostics {
            warn!("{diagnostic}");
        }
        self.diagnostics.extend(sub.diagnostics);
    }
}
