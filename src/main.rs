use anyhow::Context;
use clap::Parser;
use graphbeam::{ImportJob, Importer, MemoryGraph};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bulk-load delimited vertex and edge files into a property graph.
///
/// Runs the import job against the in-memory store, which makes it a dry run:
/// every file is parsed, coerced and committed under the job's schema, and the
/// resulting metrics and diagnostics are reported.
#[derive(Parser)]
#[command(name = "graphbeam")]
#[command(version, long_about = None)]
struct Cli {
    /// Import job description (JSON).
    #[arg(long, env = "GRAPHBEAM_JOB", value_name = "PATH")]
    job: PathBuf,

    /// Wipe the graph before loading.
    #[arg(long)]
    clear: bool,

    /// Override the job's batch size.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override the job's worker count.
    #[arg(long)]
    threads: Option<usize>,

    /// Create every edge in both directions.
    #[arg(long)]
    undirected: bool,

    /// Suppress periodic progress lines.
    #[arg(long)]
    quiet: bool,

    /// Write metrics as JSON to this file.
    #[arg(long, value_name = "PATH")]
    metrics_out: Option<PathBuf>,

    /// Write diagnostics as JSON to this file.
    #[arg(long, value_name = "PATH")]
    diagnostics_out: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut job = ImportJob::from_json_file(&cli.job)?;
    job.clear |= cli.clear;
    job.options.undirected |= cli.undirected;
    if cli.quiet {
        job.options.print_progress = false;
    }
    if let Some(batch_size) = cli.batch_size {
        job.options.batch_size = batch_size;
    }
    if let Some(threads) = cli.threads {
        job.options.thread_count = threads;
    }

    info!(
        job = %cli.job.display(),
        batch_size = job.options.batch_size,
        threads = job.options.thread_count,
        "starting import"
    );
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), job.options.clone())?;
    let reports = importer.import(&job)?;
    importer.close_connection()?;

    for report in &reports {
        info!(
            file = %report.file,
            label = %report.label,
            records = report.records,
            "file done"
        );
    }
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        diagnostics = importer.diagnostics().count(),
        "import finished"
    );

    importer.metrics().print();
    if let Some(path) = &cli.metrics_out {
        importer
            .metrics()
            .save_to_file(path)
            .with_context(|| format!("write metrics to {}", path.display()))?;
    }
    if let Some(path) = &cli.diagnostics_out {
        importer
            .diagnostics()
            .write_to_file(path)
            .with_context(|| format!("write diagnostics to {}", path.display()))?;
    }
    Ok(())
}
