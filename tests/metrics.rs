//! Tests for the metrics module.

use anyhow::Result;
use graphbeam::metrics::{CounterMetric, GaugeMetric, MetricsCollector};
use serde_json::json;
use tempfile::NamedTempFile;

#[test]
fn test_counter_metric() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::with_value("test_counter", 5)));

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.get("test_counter").unwrap(), &json!(5));
    assert_eq!(collector.counter("test_counter"), 5);
}

#[test]
fn test_gauge_metric() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(
        GaugeMetric::new("test_gauge", 42.5).with_description("Test gauge"),
    ));

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.get("test_gauge").unwrap(), &json!(42.5));
    assert_eq!(collector.counter("test_gauge"), 0);
}

#[test]
fn test_increment_counter() {
    let collector = MetricsCollector::new();
    collector.increment_counter("records_read", 1);
    collector.increment_counter("records_read", 5);
    assert_eq!(collector.counter("records_read"), 6);
    assert_eq!(collector.counter("missing"), 0);
}

#[test]
fn test_increment_registered_counter() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::new("tx_commits")));
    collector.increment_counter("tx_commits", 3);
    assert_eq!(collector.counter("tx_commits"), 3);
}

#[test]
fn test_clones_share_state() {
    let collector = MetricsCollector::new();
    let clone = collector.clone();
    clone.increment_counter("edges_created", 2);
    assert_eq!(collector.counter("edges_created"), 2);
}

#[test]
fn test_timing() {
    let collector = MetricsCollector::new();
    assert!(collector.elapsed().is_none());
    collector.record_start();
    collector.record_end();
    assert!(collector.elapsed().is_some());
    assert!(collector.to_json().get("execution_time_ms").is_some());
}

#[test]
fn test_save_to_file() -> Result<()> {
    let collector = MetricsCollector::new();
    collector.register(Box::new(
        GaugeMetric::new("records_per_second", 10.0).with_description("rate"),
    ));
    let file = NamedTempFile::new()?;
    collector.save_to_file(file.path())?;

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(file.path())?)?;
    assert_eq!(saved["records_per_second"]["value"], json!(10.0));
    assert_eq!(saved["records_per_second"]["description"], json!("rate"));
    Ok(())
}
