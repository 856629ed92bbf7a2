//! Importer facade: schema definition, connection lifecycle and whole jobs.

use anyhow::Result;
use graphbeam::store::Multiplicity;
use graphbeam::testing::*;
use graphbeam::{
    Cardinality, EdgeOptions, GraphStore, ImportJob, Importer, LoadOptions, MemoryGraph,
    SchemaManagement, SemanticType,
};

fn quiet() -> LoadOptions {
    LoadOptions {
        thread_count: 2,
        print_progress: false,
        ..LoadOptions::default()
    }
}

#[test]
fn test_define_schema_declares_everything() -> Result<()> {
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), quiet())?;
    importer.define_schema(&person_schema())?;

    assert!(graph.has_vertex_label("person"));
    assert_eq!(graph.edge_multiplicity("knows"), Some(Multiplicity::Simple));
    let email = graph.property_key("email").expect("email declared");
    assert_eq!(email.semantic_type, SemanticType::Text);
    assert_eq!(email.cardinality, Cardinality::List);
    assert_eq!(graph.index_property("idIndex").as_deref(), Some("id"));
    assert!(importer.schema().is_some());
    Ok(())
}

#[test]
fn test_define_schema_is_idempotent() -> Result<()> {
    let graph = MemoryGraph::new();
    {
        // part of the schema already exists in the store
        let mut m = graph.open_management()?;
        m.make_vertex_label("person")?;
        m.make_property_key("id", SemanticType::Long, Cardinality::Single)?;
        m.commit()?;
    }

    let mut importer = Importer::new(graph.clone(), quiet())?;
    importer.define_schema(&person_schema())?;
    importer.define_schema(&person_schema())?;

    assert!(graph.has_vertex_label("person"));
    assert!(graph.property_key("born").is_some());
    assert_eq!(graph.index_property("idIndex").as_deref(), Some("id"));
    Ok(())
}

#[test]
fn test_connection_calls_are_idempotent() -> Result<()> {
    let graph = MemoryGraph::new();
    let importer = Importer::new(graph.clone(), quiet())?;
    importer.open_connection()?;
    importer.open_connection()?;
    assert!(graph.is_open());
    importer.close_connection()?;
    importer.close_connection()?;
    assert!(graph.is_closed());
    Ok(())
}

#[test]
fn test_clear_graph_wipes_and_reopens() -> Result<()> {
    let dir = TempDataDir::new()?;
    let people = dir.write_lines("person.csv", &person_lines())?;
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), quiet())?;
    importer.define_schema(&person_schema())?;
    importer.load_vertices(&people)?;
    assert_eq!(graph.vertex_count(), 4);

    importer.clear_graph()?;
    assert!(graph.is_open());
    assert_eq!(graph.vertex_count(), 0);
    assert!(!graph.has_vertex_label("person"));

    importer.define_schema(&person_schema())?;
    importer.load_vertices(&people)?;
    assert_eq!(graph.vertex_count(), 4);
    Ok(())
}

#[test]
fn test_import_job_from_json() -> Result<()> {
    let dir = TempDataDir::new()?;
    dir.write_lines("person.csv", &person_lines())?;
    dir.write_lines("friends.csv", &knows_lines())?;
    let job_path = dir.write_text(
        "job.json",
        r#"{
            "schema": {
                "vertex_labels": ["person"],
                "edge_labels": ["knows"],
                "properties": {
                    "id": { "type": "long" },
                    "name": { "type": "text" },
                    "email": { "type": "text", "cardinality": "list" },
                    "since": { "type": "date" }
                },
                "indexed": ["id"]
            },
            "options": { "batch_size": 2, "thread_count": 2, "print_progress": false },
            "edges": { "labels": { "friends": "knows" } },
            "vertex_files": ["person.csv"],
            "edge_files": ["friends.csv"]
        }"#,
    )?;

    let job = ImportJob::from_json_file(&job_path)?;
    assert_eq!(job.options.batch_size, 2);
    assert!(job.vertex_files[0].is_absolute());

    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), job.options.clone())?;
    let reports = importer.import(&job)?;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].vertices_created, 4);
    assert_eq!(reports[1].label, "knows");
    assert_long_edges(&graph, "knows", "id", &[(1, 2), (2, 3)]);
    Ok(())
}

#[test]
fn test_import_with_clear_replaces_graph() -> Result<()> {
    let dir = TempDataDir::new()?;
    let people = dir.write_lines("person.csv", &person_lines())?;
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), quiet())?;

    let job = ImportJob {
        schema: person_schema(),
        options: quiet(),
        vertex_files: vec![people],
        clear: true,
        ..ImportJob::default()
    };
    importer.import(&job)?;
    importer.import(&job)?;
    assert_eq!(graph.vertex_count(), 4);
    Ok(())
}

#[test]
fn test_failed_import_closes_connection() -> Result<()> {
    let dir = TempDataDir::new()?;
    let people = dir.write_lines("person.csv", &["id|name", "oops|Ann"])?;
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), quiet())?;

    let job = ImportJob {
        schema: person_schema(),
        options: quiet(),
        vertex_files: vec![people],
        ..ImportJob::default()
    };
    assert!(importer.import(&job).is_err());
    assert!(graph.is_closed());
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() -> Result<()> {
    let dir = TempDataDir::new()?;
    let mut importer = Importer::new(MemoryGraph::new(), quiet())?;
    importer.define_schema(&person_schema())?;
    let err = importer
        .load_vertices(dir.file_path("person.csv"))
        .unwrap_err();
    assert!(format!("{err:#}").contains("person.csv"));
    Ok(())
}

#[test]
fn test_zero_threads_rejected() {
    let options = LoadOptions {
        thread_count: 0,
        ..quiet()
    };
    assert!(Importer::new(MemoryGraph::new(), options).is_err());
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_gzip_vertex_file() -> Result<()> {
    let dir = TempDataDir::new()?;
    let people = dir.write_lines("person.csv.gz", &person_lines())?;
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), quiet())?;
    importer.define_schema(&person_schema())?;

    let report = importer.load_vertices(&people)?;
    assert_eq!(report.label, "person");
    assert_eq!(graph.vertex_count(), 4);
    Ok(())
}

#[cfg(feature = "compression-zstd")]
#[test]
fn test_zstd_edge_file() -> Result<()> {
    let dir = TempDataDir::new()?;
    let people = dir.write_lines("person.csv", &person_lines())?;
    let knows = dir.write_lines("knows.csv.zst", &knows_lines())?;
    let graph = MemoryGraph::new();
    let mut importer = Importer::new(graph.clone(), quiet())?;
    importer.define_schema(&person_schema())?;
    importer.load_vertices(&people)?;

    let report = importer.load_edges(&knows, &EdgeOptions::default())?;
    assert_eq!(report.label, "knows");
    assert_eq!(graph.edge_count(), 2);
    Ok(())
}
