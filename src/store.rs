//! Graph store capability.
//!
//! The loader never implements storage. It drives a store through three
//! traits:
//!
//! - [`GraphStore`]: connection lifecycle, destructive reset, and factories for
//!   schema-management sessions and data transactions.
//! - [`SchemaManagement`]: declares labels, typed property keys and composite
//!   indexes, applied by [`commit`](SchemaManagement::commit).
//! - [`Transaction`]: stages vertex/edge writes and point lookups; nothing is
//!   visible to other transactions until [`commit`](Transaction::commit)
//!   succeeds, and a failed commit applies nothing.
//!
//! The store is shared by reference across worker threads; each transaction
//! belongs to the thread that opened it.
//!
//! [`MemoryGraph`](memory::MemoryGraph) is the in-process implementation.

pub mod memory;

use crate::coerce::TypedValue;
use crate::schema::{Cardinality, SemanticType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryGraph;

/// Failures reported by a graph store.
///
/// Any error returned by [`Transaction::commit`] is treated by the loader as
/// an opaque, retryable conflict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("graph store is closed")]
    Closed,
    #[error("transaction conflict: {0}")]
    Conflict(String),
    #[error("schema violation: {0}")]
    Schema(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("unknown vertex handle")]
    UnknownVertex,
    #[error("invalid store state: {0}")]
    InvalidState(String),
}

/// Edge-label multiplicity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    /// At most one edge of the label between an ordered pair of vertices.
    #[default]
    Simple,
    /// Any number of parallel edges.
    Multi,
}

/// A schema-editing session.
pub trait SchemaManagement {
    fn contains_vertex_label(&self, name: &str) -> bool;

    /// # Errors
    /// Fails if the label already exists or the store is closed.
    fn make_vertex_label(&mut self, name: &str) -> Result<(), StoreError>;

    fn contains_edge_label(&self, name: &str) -> bool;

    /// # Errors
    /// Fails if the label already exists or the store is closed.
    fn make_edge_label(&mut self, name: &str, multiplicity: Multiplicity) -> Result<(), StoreError>;

    fn contains_property_key(&self, name: &str) -> bool;

    /// # Errors
    /// Fails if the key already exists or the store is closed.
    fn make_property_key(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        cardinality: Cardinality,
    ) -> Result<(), StoreError>;

    fn contains_index(&self, name: &str) -> bool;

    /// Build a single-key composite index for vertex point lookups.
    ///
    /// # Errors
    /// Fails if the index exists or `property` is not a declared key.
    fn build_composite_index(&mut self, name: &str, property: &str) -> Result<(), StoreError>;

    /// Apply all staged schema edits.
    ///
    /// # Errors
    /// Fails if the store was closed in the meantime.
    fn commit(self) -> Result<(), StoreError>;
}

/// A data transaction.
pub trait Transaction {
    /// Handle to a vertex, valid within this transaction only.
    type Vertex: Clone;

    /// Stage a vertex with its single-valued properties.
    ///
    /// # Errors
    /// Fails on undeclared labels/keys or type mismatches.
    fn add_vertex(
        &mut self,
        label: &str,
        properties: &[(String, TypedValue)],
    ) -> Result<Self::Vertex, StoreError>;

    /// Append one value to a list-cardinality property.
    ///
    /// # Errors
    /// Fails on undeclared keys, non-list keys or type mismatches.
    fn append_property(
        &mut self,
        vertex: &Self::Vertex,
        key: &str,
        value: TypedValue,
    ) -> Result<(), StoreError>;

    /// Point lookup of a vertex whose property `key` equals `value`.
    ///
    /// Sees the transaction's own staged vertices as well as committed data.
    ///
    /// # Errors
    /// Fails if the store is closed.
    fn find_vertex(
        &mut self,
        key: &str,
        value: &TypedValue,
    ) -> Result<Option<Self::Vertex>, StoreError>;

    /// Stage an edge `out -label-> into`.
    ///
    /// # Errors
    /// Fails on undeclared labels/keys or type mismatches, and with
    /// [`StoreError::Constraint`] when a `SIMPLE` label already connects the
    /// pair.
    fn add_edge(
        &mut self,
        out: &Self::Vertex,
        label: &str,
        into: &Self::Vertex,
        properties: &[(String, TypedValue)],
    ) -> Result<(), StoreError>;

    /// Atomically apply every staged write.
    ///
    /// # Errors
    /// Any error means nothing was applied.
    fn commit(self) -> Result<(), StoreError>;

    /// Discard every staged write.
    fn rollback(self);
}

/// Connection to a transactional property-graph store.
pub trait GraphStore: Send + Sync {
    type Management: SchemaManagement;
    type Tx: Transaction;

    fn is_open(&self) -> bool;

    fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Reopen the connection with the configuration it was created with.
    ///
    /// # Errors
    /// Store-specific connection failures.
    fn open(&self) -> Result<(), StoreError>;

    /// # Errors
    /// Store-specific shutdown failures.
    fn close(&self) -> Result<(), StoreError>;

    /// Wipe all data and schema. Requires a closed connection.
    ///
    /// # Errors
    /// Fails if the connection is still open.
    fn clear(&self) -> Result<(), StoreError>;

    /// # Errors
    /// Fails if the store is closed.
    fn open_management(&self) -> Result<Self::Management, StoreError>;

    /// # Errors
    /// Fails if the store is closed.
    fn new_transaction(&self) -> Result<Self::Tx, StoreError>;
}
