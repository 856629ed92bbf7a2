//! In-process transactional graph store.
//!
//! [`MemoryGraph`] implements the full [`GraphStore`] capability with the same
//! observable contract a persistent store offers the loader:
//!
//! - schema is enforced: undeclared labels or keys, wrong value types and
//!   wrong cardinalities are rejected when a write is staged;
//! - transactions stage privately and apply atomically on commit;
//! - `SIMPLE` edge labels reject a second edge between the same ordered pair
//!   when it is staged, and again at commit against edges committed by
//!   concurrent transactions;
//! - indexed properties resolve point lookups through a hash index.
//!
//! Handles are cheap clones sharing one graph. For tests,
//! [`fail_next_commits`](MemoryGraph::fail_next_commits) makes the next `n`
//! transaction commits fail with [`StoreError::Conflict`].

use super::{GraphStore, Multiplicity, SchemaManagement, StoreError, Transaction};
use crate::coerce::TypedValue;
use crate::schema::{Cardinality, PropertySpec, SemanticType};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A committed vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredVertex {
    pub id: u64,
    pub label: String,
    pub properties: BTreeMap<String, Vec<TypedValue>>,
}

impl StoredVertex {
    /// First value of `key`, if any.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&TypedValue> {
        self.properties.get(key).and_then(|vals| vals.first())
    }

    /// All values of `key` in insertion order.
    #[must_use]
    pub fn values(&self, key: &str) -> &[TypedValue] {
        self.properties.get(key).map_or(&[], Vec::as_slice)
    }
}

/// A committed edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEdge {
    pub id: u64,
    pub label: String,
    pub out_v: u64,
    pub in_v: u64,
    pub properties: BTreeMap<String, TypedValue>,
}

#[derive(Default)]
struct GraphState {
    vertex_labels: BTreeSet<String>,
    edge_labels: BTreeMap<String, Multiplicity>,
    keys: BTreeMap<String, PropertySpec>,
    /// index name -> indexed property
    indexes: BTreeMap<String, String>,
    /// indexed property -> value -> vertex ids
    index_data: HashMap<String, HashMap<TypedValue, Vec<u64>>>,
    vertices: BTreeMap<u64, StoredVertex>,
    edges: Vec<StoredEdge>,
    next_id: u64,
}

impl GraphState {
    fn check_key(
        &self,
        key: &str,
        value: &TypedValue,
        cardinality: Option<Cardinality>,
    ) -> Result<(), StoreError> {
        let spec = self
            .keys
            .get(key)
            .ok_or_else(|| StoreError::Schema(format!("undeclared property key '{key}'")))?;
        if spec.semantic_type != value.semantic_type() {
            return Err(StoreError::Schema(format!(
                "property '{key}' expects {}, got {}",
                spec.semantic_type,
                value.semantic_type()
            )));
        }
        if let Some(c) = cardinality
            && spec.cardinality != c
        {
            return Err(StoreError::Schema(format!(
                "property '{key}' has cardinality {:?}, not {c:?}",
                spec.cardinality
            )));
        }
        Ok(())
    }

    fn lookup(&self, key: &str, value: &TypedValue) -> Option<u64> {
        if let Some(index) = self.index_data.get(key) {
            return index.get(value).and_then(|ids| ids.first().copied());
        }
        self.vertices
            .values()
            .find(|v| v.properties.get(key).is_some_and(|vals| vals.contains(value)))
            .map(|v| v.id)
    }

    fn index_value(&mut self, id: u64, key: &str, value: &TypedValue) {
        if let Some(index) = self.index_data.get_mut(key) {
            index.entry(value.clone()).or_default().push(id);
        }
    }

    fn rebuild_index(&mut self, property: &str) {
        let mut index: HashMap<TypedValue, Vec<u64>> = HashMap::new();
        for v in self.vertices.values() {
            for value in v.values(property) {
                index.entry(value.clone()).or_default().push(v.id);
            }
        }
        self.index_data.insert(property.to_string(), index);
    }

    fn has_edge(&self, label: &str, out_v: u64, in_v: u64) -> bool {
        self.edges
            .iter()
            .any(|e| e.out_v == out_v && e.in_v == in_v && e.label == label)
    }
}

struct Shared {
    state: Mutex<GraphState>,
    open: AtomicBool,
    injected_conflicts: AtomicU32,
    commit_attempts: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }
}

/// Shared handle to an in-memory graph.
#[derive(Clone)]
pub struct MemoryGraph {
    shared: Arc<Shared>,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    /// Create an empty graph with an open connection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(GraphState::default()),
                open: AtomicBool::new(true),
                injected_conflicts: AtomicU32::new(0),
                commit_attempts: AtomicU64::new(0),
            }),
        }
    }

    /// Make the next `n` transaction commits fail with a conflict.
    pub fn fail_next_commits(&self, n: u32) {
        self.shared.injected_conflicts.store(n, Ordering::SeqCst);
    }

    /// Number of transaction commits attempted so far, failed ones included.
    #[must_use]
    pub fn commit_attempts(&self) -> u64 {
        self.shared.commit_attempts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.shared.lock().vertices.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.shared.lock().edges.len()
    }

    /// All committed vertices, ordered by id.
    #[must_use]
    pub fn vertices(&self) -> Vec<StoredVertex> {
        self.shared.lock().vertices.values().cloned().collect()
    }

    /// All committed edges, in commit order.
    #[must_use]
    pub fn edges(&self) -> Vec<StoredEdge> {
        self.shared.lock().edges.clone()
    }

    /// First committed vertex whose `key` equals `value`.
    #[must_use]
    pub fn find_vertex(&self, key: &str, value: &TypedValue) -> Option<StoredVertex> {
        let state = self.shared.lock();
        state.lookup(key, value).and_then(|id| state.vertices.get(&id).cloned())
    }

    #[must_use]
    pub fn has_vertex_label(&self, name: &str) -> bool {
        self.shared.lock().vertex_labels.contains(name)
    }

    #[must_use]
    pub fn edge_multiplicity(&self, name: &str) -> Option<Multiplicity> {
        self.shared.lock().edge_labels.get(name).copied()
    }

    #[must_use]
    pub fn property_key(&self, name: &str) -> Option<PropertySpec> {
        self.shared.lock().keys.get(name).copied()
    }

    /// Property covered by the index called `name`.
    #[must_use]
    pub fn index_property(&self, name: &str) -> Option<String> {
        self.shared.lock().indexes.get(name).cloned()
    }
}

impl GraphStore for MemoryGraph {
    type Management = MemoryManagement;
    type Tx = MemoryTransaction;

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    fn open(&self) -> Result<(), StoreError> {
        self.shared.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        self.shared.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.is_open() {
            return Err(StoreError::InvalidState(
                "clear requires a closed graph".to_string(),
            ));
        }
        *self.shared.lock() = GraphState::default();
        Ok(())
    }

    fn open_management(&self) -> Result<MemoryManagement, StoreError> {
        self.shared.ensure_open()?;
        Ok(MemoryManagement {
            shared: Arc::clone(&self.shared),
            ops: Vec::new(),
        })
    }

    fn new_transaction(&self) -> Result<MemoryTransaction, StoreError> {
        self.shared.ensure_open()?;
        Ok(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            vertices: Vec::new(),
            appends: Vec::new(),
            edges: Vec::new(),
        })
    }
}

enum SchemaOp {
    VertexLabel(String),
    EdgeLabel(String, Multiplicity),
    Key(String, PropertySpec),
    Index { name: String, property: String },
}

/// Schema session over a [`MemoryGraph`].
pub struct MemoryManagement {
    shared: Arc<Shared>,
    ops: Vec<SchemaOp>,
}

impl MemoryManagement {
    fn staged(&self, pred: impl Fn(&SchemaOp) -> bool) -> bool {
        self.ops.iter().any(pred)
    }
}

impl SchemaManagement for MemoryManagement {
    fn contains_vertex_label(&self, name: &str) -> bool {
        self.shared.lock().vertex_labels.contains(name)
            || self.staged(|op| matches!(op, SchemaOp::VertexLabel(n) if n == name))
    }

    fn make_vertex_label(&mut self, name: &str) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        if self.contains_vertex_label(name) {
            return Err(StoreError::Schema(format!("vertex label '{name}' already defined")));
        }
        self.ops.push(SchemaOp::VertexLabel(name.to_string()));
        Ok(())
    }

    fn contains_edge_label(&self, name: &str) -> bool {
        self.shared.lock().edge_labels.contains_key(name)
            || self.staged(|op| matches!(op, SchemaOp::EdgeLabel(n, _) if n == name))
    }

    fn make_edge_label(&mut self, name: &str, multiplicity: Multiplicity) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        if self.contains_edge_label(name) {
            return Err(StoreError::Schema(format!("edge label '{name}' already defined")));
        }
        self.ops.push(SchemaOp::EdgeLabel(name.to_string(), multiplicity));
        Ok(())
    }

    fn contains_property_key(&self, name: &str) -> bool {
        self.shared.lock().keys.contains_key(name)
            || self.staged(|op| matches!(op, SchemaOp::Key(n, _) if n == name))
    }

    fn make_property_key(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        cardinality: Cardinality,
    ) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        if self.contains_property_key(name) {
            return Err(StoreError::Schema(format!("property key '{name}' already defined")));
        }
        self.ops.push(SchemaOp::Key(
            name.to_string(),
            PropertySpec {
                semantic_type,
                cardinality,
            },
        ));
        Ok(())
    }

    fn contains_index(&self, name: &str) -> bool {
        self.shared.lock().indexes.contains_key(name)
            || self.staged(|op| matches!(op, SchemaOp::Index { name: n, .. } if n == name))
    }

    fn build_composite_index(&mut self, name: &str, property: &str) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        if self.contains_index(name) {
            return Err(StoreError::Schema(format!("index '{name}' already defined")));
        }
        if !self.contains_property_key(property) {
            return Err(StoreError::Schema(format!(
                "cannot index undeclared property key '{property}'"
            )));
        }
        self.ops.push(SchemaOp::Index {
            name: name.to_string(),
            property: property.to_string(),
        });
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        let mut state = self.shared.lock();
        for op in self.ops {
            match op {
                SchemaOp::VertexLabel(name) => {
                    state.vertex_labels.insert(name);
                }
                SchemaOp::EdgeLabel(name, multiplicity) => {
                    state.edge_labels.insert(name, multiplicity);
                }
                SchemaOp::Key(name, spec) => {
                    state.keys.insert(name, spec);
                }
                SchemaOp::Index { name, property } => {
                    state.rebuild_index(&property);
                    state.indexes.insert(name, property);
                }
            }
        }
        Ok(())
    }
}

/// Vertex handle inside a [`MemoryTransaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexHandle {
    /// A committed vertex, by id.
    Stored(u64),
    /// A vertex staged by this transaction, by staging position.
    Staged(usize),
}

struct StagedVertex {
    label: String,
    properties: BTreeMap<String, Vec<TypedValue>>,
}

struct StagedEdge {
    out: VertexHandle,
    label: String,
    into: VertexHandle,
    properties: BTreeMap<String, TypedValue>,
}

/// Transaction over a [`MemoryGraph`].
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    vertices: Vec<StagedVertex>,
    appends: Vec<(u64, String, TypedValue)>,
    edges: Vec<StagedEdge>,
}

impl MemoryTransaction {
    fn check_handle(&self, handle: VertexHandle) -> Result<(), StoreError> {
        let known = match handle {
            VertexHandle::Stored(id) => self.shared.lock().vertices.contains_key(&id),
            VertexHandle::Staged(i) => i < self.vertices.len(),
        };
        if known {
            Ok(())
        } else {
            Err(StoreError::UnknownVertex)
        }
    }

    /// Whether an edge `out -label-> into` is already committed or staged here.
    /// A staged vertex has no committed edges.
    fn connects(&self, out: VertexHandle, label: &str, into: VertexHandle) -> bool {
        let committed = match (out, into) {
            (VertexHandle::Stored(o), VertexHandle::Stored(i)) => {
                self.shared.lock().has_edge(label, o, i)
            }
            _ => false,
        };
        committed
            || self
                .edges
                .iter()
                .any(|e| e.out == out && e.into == into && e.label == label)
    }
}

impl Transaction for MemoryTransaction {
    type Vertex = VertexHandle;

    fn add_vertex(
        &mut self,
        label: &str,
        properties: &[(String, TypedValue)],
    ) -> Result<VertexHandle, StoreError> {
        self.shared.ensure_open()?;
        let state = self.shared.lock();
        if !state.vertex_labels.contains(label) {
            return Err(StoreError::Schema(format!("undeclared vertex label '{label}'")));
        }
        let mut staged = BTreeMap::new();
        for (key, value) in properties {
            state.check_key(key, value, Some(Cardinality::Single))?;
            staged.insert(key.clone(), vec![value.clone()]);
        }
        drop(state);
        self.vertices.push(StagedVertex {
            label: label.to_string(),
            properties: staged,
        });
        Ok(VertexHandle::Staged(self.vertices.len() - 1))
    }

    fn append_property(
        &mut self,
        vertex: &VertexHandle,
        key: &str,
        value: TypedValue,
    ) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        self.shared
            .lock()
            .check_key(key, &value, Some(Cardinality::List))?;
        self.check_handle(*vertex)?;
        match *vertex {
            VertexHandle::Staged(i) => self.vertices[i]
                .properties
                .entry(key.to_string())
                .or_default()
                .push(value),
            VertexHandle::Stored(id) => self.appends.push((id, key.to_string(), value)),
        }
        Ok(())
    }

    fn find_vertex(
        &mut self,
        key: &str,
        value: &TypedValue,
    ) -> Result<Option<VertexHandle>, StoreError> {
        self.shared.ensure_open()?;
        if let Some(i) = self
            .vertices
            .iter()
            .position(|v| v.properties.get(key).is_some_and(|vals| vals.contains(value)))
        {
            return Ok(Some(VertexHandle::Staged(i)));
        }
        Ok(self.shared.lock().lookup(key, value).map(VertexHandle::Stored))
    }

    fn add_edge(
        &mut self,
        out: &VertexHandle,
        label: &str,
        into: &VertexHandle,
        properties: &[(String, TypedValue)],
    ) -> Result<(), StoreError> {
        self.shared.ensure_open()?;
        let simple = {
            let state = self.shared.lock();
            let Some(&multiplicity) = state.edge_labels.get(label) else {
                return Err(StoreError::Schema(format!("undeclared edge label '{label}'")));
            };
            for (key, value) in properties {
                state.check_key(key, value, None)?;
            }
            multiplicity == Multiplicity::Simple
        };
        self.check_handle(*out)?;
        self.check_handle(*into)?;
        if simple && self.connects(*out, label, *into) {
            return Err(StoreError::Constraint(format!(
                "SIMPLE edge label '{label}' already connects {out:?} -> {into:?}"
            )));
        }
        self.edges.push(StagedEdge {
            out: *out,
            label: label.to_string(),
            into: *into,
            properties: properties.iter().cloned().collect(),
        });
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        self.shared.commit_attempts.fetch_add(1, Ordering::SeqCst);
        self.shared.ensure_open()?;
        if self
            .shared
            .injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Conflict("injected commit failure".to_string()));
        }

        let mut state = self.shared.lock();
        let base = state.next_id;
        let resolve = |handle: VertexHandle| match handle {
            VertexHandle::Stored(id) => id,
            VertexHandle::Staged(i) => base + i as u64,
        };

        // validate everything before touching state
        for (id, _, _) in &self.appends {
            if !state.vertices.contains_key(id) {
                return Err(StoreError::UnknownVertex);
            }
        }
        let mut pending: Vec<(u64, u64, &str)> = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let (out_v, in_v) = (resolve(edge.out), resolve(edge.into));
            for handle in [edge.out, edge.into] {
                if let VertexHandle::Stored(id) = handle
                    && !state.vertices.contains_key(&id)
                {
                    return Err(StoreError::UnknownVertex);
                }
            }
            let simple = matches!(state.edge_labels.get(&edge.label), Some(Multiplicity::Simple));
            if simple
                && (state.has_edge(&edge.label, out_v, in_v)
                    || pending
                        .iter()
                        .any(|&(o, i, l)| o == out_v && i == in_v && l == edge.label))
            {
                return Err(StoreError::Constraint(format!(
                    "SIMPLE edge label '{}' already connects {out_v} -> {in_v}",
                    edge.label
                )));
            }
            pending.push((out_v, in_v, &edge.label));
        }

        for (i, staged) in self.vertices.into_iter().enumerate() {
            let id = base + i as u64;
            for (key, values) in &staged.properties {
                for value in values {
                    state.index_value(id, key, value);
                }
            }
            state.vertices.insert(
                id,
                StoredVertex {
                    id,
                    label: staged.label,
                    properties: staged.properties,
                },
            );
            state.next_id = id + 1;
        }
        for (id, key, value) in self.appends {
            state.index_value(id, &key, &value);
            if let Some(v) = state.vertices.get_mut(&id) {
                v.properties.entry(key).or_default().push(value);
            }
        }
        for edge in self.edges {
            let id = state.next_id;
            state.next_id += 1;
            let (out_v, in_v) = (resolve(edge.out), resolve(edge.into));
            state.edges.push(StoredEdge {
                id,
                label: edge.label,
                out_v,
                in_v,
                properties: edge.properties,
            });
        }
        Ok(())
    }

    fn rollback(self) {}
}
