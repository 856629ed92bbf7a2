//! Assertions over a loaded [`MemoryGraph`].

use crate::coerce::TypedValue;
use crate::store::MemoryGraph;
use std::collections::HashMap;

/// Edges labelled `label` as `(out key, in key)` pairs, sorted, where keys are
/// the endpoints' values of property `key`.
#[must_use]
pub fn edge_pairs(graph: &MemoryGraph, label: &str, key: &str) -> Vec<(TypedValue, TypedValue)> {
    let keys: HashMap<u64, TypedValue> = graph
        .vertices()
        .into_iter()
        .filter_map(|v| v.value(key).cloned().map(|k| (v.id, k)))
        .collect();
    let mut pairs: Vec<_> = graph
        .edges()
        .into_iter()
        .filter(|e| e.label == label)
        .filter_map(|e| Some((keys.get(&e.out_v)?.clone(), keys.get(&e.in_v)?.clone())))
        .collect();
    pairs.sort_by_key(|(a, b)| (a.to_string(), b.to_string()));
    pairs
}

/// Assert the `label` edges of `graph` connect exactly the given `long` id
/// pairs (order-independent).
///
/// # Panics
///
/// Panics if the edge set differs.
///
/// # Example
///
/// ```
/// use graphbeam::testing::assert_long_edges;
/// use graphbeam::MemoryGraph;
///
/// assert_long_edges(&MemoryGraph::new(), "knows", "id", &[]);
/// ```
pub fn assert_long_edges(graph: &MemoryGraph, label: &str, key: &str, expected: &[(i64, i64)]) {
    let actual = edge_pairs(graph, label, key);
    let mut expected: Vec<_> = expected
        .iter()
        .map(|&(a, b)| (TypedValue::Long(a), TypedValue::Long(b)))
        .collect();
    expected.sort_by_key(|(a, b)| (a.to_string(), b.to_string()));
    assert_eq!(
        actual, expected,
        "Edge mismatch for label {label:?}:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert exactly `expected` committed vertices carry `label`.
///
/// # Panics
///
/// Panics if the count differs.
pub fn assert_vertex_count(graph: &MemoryGraph, label: &str, expected: usize) {
    let actual = graph.vertices().iter().filter(|v| v.label == label).count();
    assert_eq!(
        actual, expected,
        "Vertex count mismatch for label {label:?}:\n  Expected: {expected}\n  Actual: {actual}"
    );
}
