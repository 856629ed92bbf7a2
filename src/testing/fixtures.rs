//! Pre-built schema and data files.

use crate::schema::{Cardinality, Schema, SemanticType};

/// A `person` / `knows` schema covering every semantic type.
///
/// | property | type    | cardinality | indexed |
/// |----------|---------|-------------|---------|
/// | id       | long    | single      | yes     |
/// | name     | text    | single      |         |
/// | email    | text    | list        |         |
/// | age      | integer | single      |         |
/// | active   | boolean | single      |         |
/// | born     | date    | single      |         |
/// | visited  | date    | list        |         |
/// | since    | date    | single      |         |
/// | weight   | integer | single      |         |
///
/// ```
/// use graphbeam::testing::person_schema;
///
/// let schema = person_schema();
/// assert!(schema.is_indexed("id"));
/// ```
#[must_use]
pub fn person_schema() -> Schema {
    Schema::new()
        .vertex_label("person")
        .edge_label("knows")
        .property("id", SemanticType::Long, Cardinality::Single)
        .property("name", SemanticType::Text, Cardinality::Single)
        .property("email", SemanticType::Text, Cardinality::List)
        .property("age", SemanticType::Integer, Cardinality::Single)
        .property("active", SemanticType::Boolean, Cardinality::Single)
        .property("born", SemanticType::Date, Cardinality::Single)
        .property("visited", SemanticType::Date, Cardinality::List)
        .property("since", SemanticType::Date, Cardinality::Single)
        .property("weight", SemanticType::Integer, Cardinality::Single)
        .indexed("id")
}

/// Header plus four people. Person 4 has no email and an empty name.
#[must_use]
pub fn person_lines() -> Vec<String> {
    [
        "id|name|email",
        "1|Ann|a@x.com;a2@x.com",
        "2|Bob|bob@x.com",
        "3|Cid|",
        "4||",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// Header plus `count` generated people with ids `1..=count`.
#[must_use]
pub fn generated_person_lines(count: u64) -> Vec<String> {
    std::iter::once("id|name|age|active".to_string())
        .chain((1..=count).map(|id| format!("{id}|person-{id}|{}|{}", id % 90, id % 2 == 0)))
        .collect()
}

/// Header plus `1 -> 2` and `2 -> 3`, matching [`person_lines`].
#[must_use]
pub fn knows_lines() -> Vec<String> {
    ["id1|id2|since", "1|2|2020-01-05", "2|3|2021-03-01"]
        .iter()
        .map(ToString::to_string)
        .collect()
}
