//! Tests for type coercion and property sets.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use graphbeam::coerce::{Coercion, TypedPropertySet, TypedValue, coerce};
use graphbeam::testing::person_schema;
use graphbeam::{LoadError, SemanticType};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[test]
fn test_scalar_types() -> Result<()> {
    let schema = person_schema();
    assert_eq!(
        coerce(&schema, "name", "Ann")?,
        Coercion::Value(TypedValue::Text("Ann".into()))
    );
    assert_eq!(
        coerce(&schema, "active", "TRUE")?,
        Coercion::Value(TypedValue::Boolean(true))
    );
    assert_eq!(
        coerce(&schema, "active", "false")?,
        Coercion::Value(TypedValue::Boolean(false))
    );
    assert_eq!(
        coerce(&schema, "age", "-42")?,
        Coercion::Value(TypedValue::Integer(-42))
    );
    assert_eq!(
        coerce(&schema, "id", "9000000000")?,
        Coercion::Value(TypedValue::Long(9_000_000_000))
    );
    assert_eq!(
        coerce(&schema, "born", "2001-02-03")?,
        Coercion::Value(TypedValue::Date(
            Utc.with_ymd_and_hms(2001, 2, 3, 0, 0, 0).unwrap()
        ))
    );
    Ok(())
}

#[test]
fn test_text_is_not_trimmed() -> Result<()> {
    let schema = person_schema();
    assert_eq!(
        coerce(&schema, "name", " Ann ")?,
        Coercion::Value(TypedValue::Text(" Ann ".into()))
    );
    Ok(())
}

#[test]
fn test_integer_overflow_is_invalid() {
    let schema = person_schema();
    let err = coerce(&schema, "age", "3000000000").unwrap_err();
    assert!(matches!(
        err,
        LoadError::InvalidValue { expected: SemanticType::Integer, .. }
    ));
}

#[test]
fn test_boolean_is_strict() {
    let schema = person_schema();
    let err = coerce(&schema, "active", "yes").unwrap_err();
    assert!(matches!(err, LoadError::InvalidValue { ref value, .. } if value == "yes"));
}

#[test]
fn test_unregistered_property() {
    let schema = person_schema();
    let err = coerce(&schema, "nickname", "Annie").unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedType { ref property } if property == "nickname"));
}

#[test]
fn test_bad_date_is_omitted() -> Result<()> {
    let schema = person_schema();
    let got = coerce(&schema, "born", "2001-02-30")?;
    assert!(matches!(got, Coercion::Omitted { .. }), "got {got:?}");
    let got = coerce(&schema, "born", "03/02/2001")?;
    assert!(matches!(got, Coercion::Omitted { .. }), "got {got:?}");
    Ok(())
}

#[test]
fn test_vertex_property_set() -> Result<()> {
    let schema = person_schema();
    let columns = strings(&["id", "name", "email"]);
    let values = strings(&["1", "Ann", "a@x.com;a2@x.com"]);

    let set = TypedPropertySet::for_vertex(&schema, &columns, &values, 2)?;
    assert_eq!(
        set.single,
        vec![
            ("id".to_string(), TypedValue::Long(1)),
            ("name".to_string(), TypedValue::Text("Ann".into())),
        ]
    );
    assert_eq!(
        set.lists,
        vec![(
            "email".to_string(),
            vec![
                TypedValue::Text("a@x.com".into()),
                TypedValue::Text("a2@x.com".into())
            ]
        )]
    );
    assert!(set.omitted.is_empty());
    Ok(())
}

#[test]
fn test_empty_columns_contribute_nothing() -> Result<()> {
    let schema = person_schema();
    let columns = strings(&["id", "name", "email"]);
    let values = strings(&["4", "", ""]);

    let set = TypedPropertySet::for_vertex(&schema, &columns, &values, 5)?;
    assert_eq!(set.single, vec![("id".to_string(), TypedValue::Long(4))]);
    assert!(set.lists.is_empty());
    Ok(())
}

#[test]
fn test_empty_column_of_unknown_property_is_ignored() -> Result<()> {
    let schema = person_schema();
    let columns = strings(&["id", "nickname"]);
    let values = strings(&["4", ""]);

    let set = TypedPropertySet::for_vertex(&schema, &columns, &values, 5)?;
    assert_eq!(set.single.len(), 1);
    Ok(())
}

#[test]
fn test_list_dates_are_parsed_per_element() -> Result<()> {
    let schema = person_schema();
    let columns = strings(&["id", "visited"]);
    let values = strings(&["7", "2020-01-01;;not-a-date;2020-12-31"]);

    let set = TypedPropertySet::for_vertex(&schema, &columns, &values, 9)?;
    let (name, visited) = &set.lists[0];
    assert_eq!(name, "visited");
    assert_eq!(
        visited,
        &vec![
            TypedValue::Date(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            TypedValue::Date(Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap()),
        ]
    );
    assert_eq!(set.omitted.len(), 1);
    assert_eq!(set.omitted[0].value, "not-a-date");
    Ok(())
}

#[test]
fn test_invalid_value_carries_line() {
    let schema = person_schema();
    let columns = strings(&["id", "age"]);
    let values = strings(&["1", "old"]);

    let err = TypedPropertySet::for_vertex(&schema, &columns, &values, 12).unwrap_err();
    assert!(matches!(
        err,
        LoadError::InvalidValue { line: 12, ref property, .. } if property == "age"
    ));
}

#[test]
fn test_edge_property_set_is_single_valued() -> Result<()> {
    let schema = person_schema();
    let columns = strings(&["since", "weight"]);
    let values = strings(&["2020-01-05", "3"]);

    let set = TypedPropertySet::for_edge(&schema, &columns, &values, 2)?;
    assert_eq!(set.single.len(), 2);
    assert!(set.lists.is_empty());
    assert_eq!(set.single[1], ("weight".to_string(), TypedValue::Integer(3)));
    Ok(())
}
