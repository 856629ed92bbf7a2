//! Type coercion: raw column text to typed property values.
//!
//! [`coerce`] converts one raw string according to the schema entry of its
//! property. Date values that fail to parse do **not** fail the record: they
//! come back as [`Coercion::Omitted`] so the caller can log the event and leave
//! the property unset. All other parse failures are hard errors.
//!
//! [`TypedPropertySet::for_vertex`] and [`TypedPropertySet::for_edge`] apply the
//! table to a whole record.

use crate::error::{LoadError, Result};
use crate::schema::{Cardinality, Schema, SemanticType};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between values of a list-cardinality column.
pub const LIST_DELIMITER: char = ';';

/// `chrono` pattern for date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A property value after coercion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedValue {
    Text(String),
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Date(DateTime<Utc>),
}

impl TypedValue {
    #[must_use]
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Text(_) => SemanticType::Text,
            Self::Boolean(_) => SemanticType::Boolean,
            Self::Integer(_) => SemanticType::Integer,
            Self::Long(_) => SemanticType::Long,
            Self::Date(_) => SemanticType::Date,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

/// Outcome of coercing one raw value.
#[derive(Clone, Debug, PartialEq)]
pub enum Coercion {
    Value(TypedValue),
    /// The value was dropped; `reason` says why.
    Omitted { reason: String },
}

/// Coerce `raw` to the declared type of `property`.
///
/// # Errors
/// - [`LoadError::UnsupportedType`] if `property` is not in the schema.
/// - [`LoadError::InvalidValue`] (with `line` 0) if a boolean or numeric value
///   does not parse.
pub fn coerce(schema: &Schema, property: &str, raw: &str) -> Result<Coercion> {
    let spec = schema.require(property)?;
    coerce_as(spec.semantic_type, property, raw)
}

pub(crate) fn coerce_as(semantic_type: SemanticType, property: &str, raw: &str) -> Result<Coercion> {
    let invalid = || LoadError::InvalidValue {
        line: 0,
        property: property.to_string(),
        value: raw.to_string(),
        expected: semantic_type,
    };
    let value = match semantic_type {
        SemanticType::Text => TypedValue::Text(raw.to_string()),
        SemanticType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                TypedValue::Boolean(true)
            } else if raw.eq_ignore_ascii_case("false") {
                TypedValue::Boolean(false)
            } else {
                return Err(invalid());
            }
        }
        SemanticType::Integer => TypedValue::Integer(raw.parse().map_err(|_| invalid())?),
        SemanticType::Long => TypedValue::Long(raw.parse().map_err(|_| invalid())?),
        SemanticType::Date => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => TypedValue::Date(date.and_time(NaiveTime::MIN).and_utc()),
            Err(e) => {
                return Ok(Coercion::Omitted {
                    reason: e.to_string(),
                });
            }
        },
    };
    Ok(Coercion::Value(value))
}

/// A value left out of a property set, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Omission {
    pub property: String,
    pub value: String,
    pub reason: String,
}

/// Typed properties of one record.
///
/// Single-cardinality properties are kept in column order and go into the
/// element-creation call; list properties are appended one value at a time
/// afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypedPropertySet {
    pub single: Vec<(String, TypedValue)>,
    pub lists: Vec<(String, Vec<TypedValue>)>,
    pub omitted: Vec<Omission>,
}

impl TypedPropertySet {
    /// Coerce the columns of a vertex record, honouring each property's
    /// cardinality. Empty columns and empty list elements contribute nothing.
    ///
    /// # Errors
    /// See [`coerce`]; `InvalidValue` carries `line`.
    pub fn for_vertex(
        schema: &Schema,
        columns: &[String],
        values: &[String],
        line: u64,
    ) -> Result<Self> {
        let mut set = Self::default();
        for (name, raw) in columns.iter().zip(values) {
            if raw.is_empty() {
                continue;
            }
            let spec = schema.require(name)?;
            match spec.cardinality {
                Cardinality::Single => {
                    if let Some(v) = set.coerce_one(spec.semantic_type, name, raw, line)? {
                        set.single.push((name.clone(), v));
                    }
                }
                Cardinality::List => {
                    let mut list = Vec::new();
                    for element in raw.split(LIST_DELIMITER).filter(|e| !e.is_empty()) {
                        if let Some(v) = set.coerce_one(spec.semantic_type, name, element, line)? {
                            list.push(v);
                        }
                    }
                    if !list.is_empty() {
                        set.lists.push((name.clone(), list));
                    }
                }
            }
        }
        Ok(set)
    }

    /// Coerce the property columns of an edge record. Edges carry single
    /// values only, so every column is coerced whole.
    ///
    /// # Errors
    /// See [`coerce`]; `InvalidValue` carries `line`.
    pub fn for_edge(
        schema: &Schema,
        columns: &[String],
        values: &[String],
        line: u64,
    ) -> Result<Self> {
        let mut set = Self::default();
        for (name, raw) in columns.iter().zip(values) {
            if raw.is_empty() {
                continue;
            }
            let spec = schema.require(name)?;
            if let Some(v) = set.coerce_one(spec.semantic_type, name, raw, line)? {
                set.single.push((name.clone(), v));
            }
        }
        Ok(set)
    }

    fn coerce_one(
        &mut self,
        semantic_type: SemanticType,
        name: &str,
        raw: &str,
        line: u64,
    ) -> Result<Option<TypedValue>> {
        match coerce_as(semantic_type, name, raw).map_err(|e| e.at_line(line))? {
            Coercion::Value(v) => Ok(Some(v)),
            Coercion::Omitted { reason } => {
                self.omitted.push(Omission {
                    property: name.to_string(),
                    value: raw.to_string(),
                    reason,
                });
                Ok(None)
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_is_midnight_utc() {
        let got = coerce_as(SemanticType::Date, "birthday", "1989-12-03").unwrap();
        let Coercion::Value(TypedValue::Date(d)) = got else {
            panic!("expected a date, got {got:?}");
        };
        assert_eq!(d.to_rfc3339(), "1989-12-03T00:00:00+00:00");
    }

    #[test]
    fn invalid_long_reports_property() {
        let err = coerce_as(SemanticType::Long, "id", "x1").unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { ref property, .. } if property == "id"));
    }
}
