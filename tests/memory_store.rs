//! Tests for the in-memory graph store.

use anyhow::Result;
use graphbeam::store::memory::VertexHandle;
use graphbeam::store::{Multiplicity, StoreError};
use graphbeam::{
    Cardinality, GraphStore, MemoryGraph, SchemaManagement, SemanticType, Transaction, TypedValue,
};

fn graph_with_schema() -> Result<MemoryGraph> {
    let graph = MemoryGraph::new();
    let mut m = graph.open_management()?;
    m.make_vertex_label("person")?;
    m.make_edge_label("knows", Multiplicity::Simple)?;
    m.make_property_key("id", SemanticType::Long, Cardinality::Single)?;
    m.make_property_key("email", SemanticType::Text, Cardinality::List)?;
    m.build_composite_index("idIndex", "id")?;
    m.commit()?;
    Ok(graph)
}

fn id(value: i64) -> Vec<(String, TypedValue)> {
    vec![("id".to_string(), TypedValue::Long(value))]
}

#[test]
fn test_schema_is_applied_on_commit() -> Result<()> {
    let graph = MemoryGraph::new();
    let mut m = graph.open_management()?;
    m.make_vertex_label("person")?;
    assert!(m.contains_vertex_label("person"));
    assert!(!graph.has_vertex_label("person"));
    m.commit()?;
    assert!(graph.has_vertex_label("person"));
    Ok(())
}

#[test]
fn test_duplicate_schema_element_is_rejected() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut m = graph.open_management()?;
    assert!(m.contains_property_key("id"));
    assert!(matches!(
        m.make_property_key("id", SemanticType::Long, Cardinality::Single),
        Err(StoreError::Schema(_))
    ));
    assert!(matches!(
        m.build_composite_index("nameIndex", "name"),
        Err(StoreError::Schema(_))
    ));
    assert_eq!(graph.index_property("idIndex").as_deref(), Some("id"));
    assert_eq!(graph.edge_multiplicity("knows"), Some(Multiplicity::Simple));
    Ok(())
}

#[test]
fn test_commit_is_atomic_and_isolated() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    let v = tx.add_vertex("person", &id(1))?;
    tx.append_property(&v, "email", TypedValue::Text("a@x.com".into()))?;
    tx.append_property(&v, "email", TypedValue::Text("b@x.com".into()))?;
    assert_eq!(graph.vertex_count(), 0);
    tx.commit()?;

    let stored = graph
        .find_vertex("id", &TypedValue::Long(1))
        .expect("vertex committed");
    assert_eq!(stored.label, "person");
    assert_eq!(
        stored.values("email"),
        [
            TypedValue::Text("a@x.com".into()),
            TypedValue::Text("b@x.com".into())
        ]
    );
    Ok(())
}

#[test]
fn test_rollback_applies_nothing() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    tx.add_vertex("person", &id(1))?;
    tx.rollback();
    assert_eq!(graph.vertex_count(), 0);
    Ok(())
}

#[test]
fn test_staging_enforces_schema() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    assert!(matches!(
        tx.add_vertex("robot", &id(1)),
        Err(StoreError::Schema(_))
    ));
    assert!(matches!(
        tx.add_vertex("person", &[("id".to_string(), TypedValue::Text("1".into()))]),
        Err(StoreError::Schema(_))
    ));
    let v = tx.add_vertex("person", &id(1))?;
    assert!(matches!(
        tx.append_property(&v, "id", TypedValue::Long(2)),
        Err(StoreError::Schema(_))
    ));
    Ok(())
}

#[test]
fn test_lookup_sees_own_writes_then_committed_data() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    let staged = tx.add_vertex("person", &id(1))?;
    assert_eq!(tx.find_vertex("id", &TypedValue::Long(1))?, Some(staged));
    tx.commit()?;

    let mut tx = graph.new_transaction()?;
    let found = tx.find_vertex("id", &TypedValue::Long(1))?;
    assert!(matches!(found, Some(VertexHandle::Stored(_))));
    assert_eq!(tx.find_vertex("id", &TypedValue::Long(2))?, None);
    Ok(())
}

#[test]
fn test_simple_multiplicity_checked_at_staging() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    let a = tx.add_vertex("person", &id(1))?;
    let b = tx.add_vertex("person", &id(2))?;
    tx.add_edge(&a, "knows", &b, &[])?;
    tx.add_edge(&b, "knows", &a, &[])?;
    assert!(matches!(
        tx.add_edge(&a, "knows", &b, &[]),
        Err(StoreError::Constraint(_))
    ));
    tx.commit()?;
    assert_eq!(graph.edge_count(), 2);

    let mut tx = graph.new_transaction()?;
    let a = tx.find_vertex("id", &TypedValue::Long(1))?.expect("a");
    let b = tx.find_vertex("id", &TypedValue::Long(2))?.expect("b");
    assert!(matches!(
        tx.add_edge(&a, "knows", &b, &[]),
        Err(StoreError::Constraint(_))
    ));
    tx.rollback();
    assert_eq!(graph.edge_count(), 2);
    Ok(())
}

#[test]
fn test_simple_multiplicity_checked_at_commit_across_transactions() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    tx.add_vertex("person", &id(1))?;
    tx.add_vertex("person", &id(2))?;
    tx.commit()?;

    let mut first = graph.new_transaction()?;
    let mut second = graph.new_transaction()?;
    for tx in [&mut first, &mut second] {
        let a = tx.find_vertex("id", &TypedValue::Long(1))?.expect("a");
        let b = tx.find_vertex("id", &TypedValue::Long(2))?.expect("b");
        tx.add_edge(&a, "knows", &b, &[])?;
    }
    first.commit()?;
    assert!(matches!(second.commit(), Err(StoreError::Constraint(_))));
    assert_eq!(graph.edge_count(), 1);
    Ok(())
}

#[test]
fn test_injected_conflicts() -> Result<()> {
    let graph = graph_with_schema()?;
    graph.fail_next_commits(2);
    for _ in 0..2 {
        let mut tx = graph.new_transaction()?;
        tx.add_vertex("person", &id(1))?;
        assert!(matches!(tx.commit(), Err(StoreError::Conflict(_))));
    }
    let mut tx = graph.new_transaction()?;
    tx.add_vertex("person", &id(1))?;
    tx.commit()?;
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.commit_attempts(), 3);
    Ok(())
}

#[test]
fn test_connection_lifecycle_and_clear() -> Result<()> {
    let graph = graph_with_schema()?;
    let mut tx = graph.new_transaction()?;
    tx.add_vertex("person", &id(1))?;
    tx.commit()?;

    assert!(matches!(graph.clear(), Err(StoreError::InvalidState(_))));
    graph.close()?;
    assert!(graph.is_closed());
    assert!(matches!(graph.new_transaction(), Err(StoreError::Closed)));
    graph.clear()?;
    graph.open()?;
    assert_eq!(graph.vertex_count(), 0);
    assert!(!graph.has_vertex_label("person"));
    Ok(())
}

#[test]
fn test_index_built_over_existing_data() -> Result<()> {
    let graph = MemoryGraph::new();
    let mut m = graph.open_management()?;
    m.make_vertex_label("person")?;
    m.make_property_key("id", SemanticType::Long, Cardinality::Single)?;
    m.commit()?;

    let mut tx = graph.new_transaction()?;
    tx.add_vertex("person", &id(5))?;
    tx.commit()?;

    let mut m = graph.open_management()?;
    m.build_composite_index("idIndex", "id")?;
    m.commit()?;
    assert!(graph.find_vertex("id", &TypedValue::Long(5)).is_some());
    Ok(())
}
