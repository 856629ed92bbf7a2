//! Tests for diagnostics collection and export.

use anyhow::Result;
use graphbeam::diagnostics::{Diagnostic, DiagnosticCollector, Endpoint};
use tempfile::NamedTempFile;

fn missing(line: u64) -> Diagnostic {
    Diagnostic::EndpointMissing {
        file: "knows.csv".into(),
        line,
        label: "knows".into(),
        out_key: "id".into(),
        out_value: "1".into(),
        in_key: "id".into(),
        in_value: "99".into(),
        missing: Endpoint::In,
    }
}

fn omitted(line: u64) -> Diagnostic {
    Diagnostic::DateOmitted {
        file: "person.csv".into(),
        line,
        property: "born".into(),
        value: "1990-13-45".into(),
        reason: "input is out of range".into(),
    }
}

#[test]
fn test_counts_by_kind() {
    let mut collector = DiagnosticCollector::new();
    collector.add(missing(2));
    collector.extend([omitted(3), omitted(4)]);

    assert_eq!(collector.count(), 3);
    assert_eq!(collector.missing_endpoints(), 1);
    assert_eq!(collector.date_omissions(), 2);
    assert_eq!(collector.diagnostics()[2].line(), 4);
    assert_eq!(collector.diagnostics()[0].file(), "knows.csv");

    collector.clear();
    assert_eq!(collector.count(), 0);
}

#[test]
fn test_display() {
    assert_eq!(
        missing(2).to_string(),
        "knows.csv:2: vertex not found: id=1 -knows-> id=99"
    );
    assert!(omitted(3).to_string().starts_with("person.csv:3: date '1990-13-45'"));
}

#[test]
fn test_json_export() -> Result<()> {
    let mut collector = DiagnosticCollector::new();
    collector.add(missing(2));
    collector.add(omitted(5));

    let file = NamedTempFile::new()?;
    collector.write_to_file(file.path())?;
    let parsed: Vec<Diagnostic> = serde_json::from_str(&std::fs::read_to_string(file.path())?)?;
    assert_eq!(parsed, collector.diagnostics());

    let raw: serde_json::Value = serde_json::from_str(&collector.to_json()?)?;
    assert_eq!(raw[0]["kind"], "endpoint_missing");
    assert_eq!(raw[0]["missing"], "in");
    assert_eq!(raw[1]["kind"], "date_omitted");
    Ok(())
}
