//! Schema description: labels, typed property keys and indexes.
//!
//! A [`Schema`] is plain data. It is declared against a store by
//! [`Importer::define_schema`](crate::Importer::define_schema) and consulted by
//! the coercion table for every column of every record.
//!
//! # Example
//!
//! ```
//! use graphbeam::schema::{Cardinality, Schema, SemanticType};
//!
//! let schema = Schema::new()
//!     .vertex_label("person")
//!     .edge_label("knows")
//!     .property("id", SemanticType::Long, Cardinality::Single)
//!     .property("email", SemanticType::Text, Cardinality::List)
//!     .indexed("id");
//!
//! assert!(schema.is_indexed("id"));
//! assert_eq!(schema.index_name("id"), "idIndex");
//! ```

use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Closed set of value types a property can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// UTF-8 text, passed through unchanged.
    Text,
    /// `true` / `false`, case-insensitive.
    Boolean,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// Calendar date in `YYYY-MM-DD` form, stored as midnight UTC.
    Date,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Date => "date",
        };
        f.write_str(name)
    }
}

/// How many values a property holds per element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// Exactly one value.
    #[default]
    Single,
    /// An ordered sequence of values packed into one column with `;`.
    List,
}

/// Declared type and cardinality of a property key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    #[serde(default)]
    pub cardinality: Cardinality,
}

/// Labels, property keys and indexed properties of a graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub vertex_labels: Vec<String>,
    #[serde(default)]
    pub edge_labels: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
    /// Properties that get a single-key composite index.
    #[serde(default)]
    pub indexed: BTreeSet<String>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_label(mut self, label: impl Into<String>) -> Self {
        self.vertex_labels.push(label.into());
        self
    }

    #[must_use]
    pub fn edge_label(mut self, label: impl Into<String>) -> Self {
        self.edge_labels.push(label.into());
        self
    }

    #[must_use]
    pub fn property(
        mut self,
        name: impl Into<String>,
        semantic_type: SemanticType,
        cardinality: Cardinality,
    ) -> Self {
        self.properties.insert(
            name.into(),
            PropertySpec {
                semantic_type,
                cardinality,
            },
        );
        self
    }

    #[must_use]
    pub fn indexed(mut self, name: impl Into<String>) -> Self {
        self.indexed.insert(name.into());
        self
    }

    /// Look up the declaration of a property.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    /// Like [`spec`](Self::spec), but an unknown property is an
    /// [`LoadError::UnsupportedType`].
    ///
    /// # Errors
    /// Returns `UnsupportedType` when `name` is not registered.
    pub fn require(&self, name: &str) -> Result<&PropertySpec> {
        self.spec(name).ok_or_else(|| LoadError::UnsupportedType {
            property: name.to_string(),
        })
    }

    #[must_use]
    pub fn is_indexed(&self, name: &str) -> bool {
        self.indexed.contains(name)
    }

    /// Name of the composite index built for `property`.
    #[must_use]
    pub fn index_name(&self, property: &str) -> String {
        format!("{property}Index")
    }
}
