//! Tests for load configuration.

use anyhow::Result;
use graphbeam::config::{DEFAULT_BATCH_SIZE, EdgeOptions, ImportJob, LoadOptions};
use graphbeam::retry::DEFAULT_MAX_RETRIES;
use graphbeam::testing::TempDataDir;
use graphbeam::{Cardinality, SemanticType};
use std::time::Duration;

#[test]
fn test_defaults() {
    let options = LoadOptions::default();
    assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(options.thread_count, num_cpus::get());
    assert_eq!(options.progress_interval(), Duration::from_secs(10));
    assert_eq!(options.max_retries, DEFAULT_MAX_RETRIES);
    assert!(!options.undirected);
    assert!(options.print_progress);
}

#[test]
fn test_partial_options_json() -> Result<()> {
    let options: LoadOptions = serde_json::from_str(r#"{ "thread_count": 3, "max_retries": 5 }"#)?;
    assert_eq!(options.thread_count, 3);
    assert_eq!(options.max_retries, 5);
    assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
    Ok(())
}

#[test]
fn test_validate() {
    for options in [
        LoadOptions { batch_size: 0, ..LoadOptions::default() },
        LoadOptions { thread_count: 0, ..LoadOptions::default() },
        LoadOptions { progress_interval_secs: 0, ..LoadOptions::default() },
    ] {
        assert!(options.validate().is_err(), "{options:?}");
    }
}

#[test]
fn test_edge_options_json() -> Result<()> {
    let edges: EdgeOptions = serde_json::from_str(
        r#"{ "labels": { "knowsFile": "knows" }, "endpoint_keys": { "src": "id" } }"#,
    )?;
    assert_eq!(edges.label_for("knowsFile"), "knows");
    assert_eq!(edges.endpoint_keys["src"], "id");
    Ok(())
}

#[test]
fn test_job_schema_json() -> Result<()> {
    let dir = TempDataDir::new()?;
    let path = dir.write_text(
        "job.json",
        r#"{
            "schema": {
                "properties": {
                    "tags": { "type": "text", "cardinality": "list" },
                    "born": { "type": "date" }
                }
            },
            "vertex_files": ["/data/person.csv", "tag.csv"],
            "clear": true
        }"#,
    )?;
    let job = ImportJob::from_json_file(&path)?;
    let tags = job.schema.spec("tags").expect("tags");
    assert_eq!(tags.semantic_type, SemanticType::Text);
    assert_eq!(tags.cardinality, Cardinality::List);
    assert_eq!(job.schema.spec("born").map(|s| s.cardinality), Some(Cardinality::Single));
    assert!(job.clear);
    assert_eq!(job.vertex_files[0].to_str(), Some("/data/person.csv"));
    assert_eq!(job.vertex_files[1], dir.file_path("tag.csv"));
    Ok(())
}

#[test]
fn test_bad_job_names_file() -> Result<()> {
    let dir = TempDataDir::new()?;
    let path = dir.write_text("job.json", "{ not json")?;
    let err = ImportJob::from_json_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("job.json"));
    Ok(())
}
