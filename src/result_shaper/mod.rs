//! Reassembles flat result rows into the nested trees the selection
//! asked for, following the shape descriptor the compiler produced.
//!
//! Collected relationship columns always come back as lists; whether a
//! list stays a list or unwraps to a single object (or `null` when
//! empty) is decided here, never by the caller. A missing member and
//! an empty traversal therefore stay distinguishable: `null` for a
//! single end, `[]` for a multiple end.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::cypher_compiler::{FieldShape, FieldShapeKind, ShapeDescriptor};
use crate::store::Row;

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Result column `{0}` is missing")]
    MissingColumn(String),

    #[error("Result column `{column}` holds {found}, expected {expected}")]
    UnexpectedValue {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Shape a statement's rows into the field's response value
pub fn shape(rows: Vec<Row>, descriptor: &ShapeDescriptor) -> Result<JsonValue, ShapeError> {
    if descriptor.passthrough {
        return Ok(JsonValue::Array(
            rows.into_iter().map(passthrough_row).collect(),
        ));
    }
    if descriptor.unwrap_single {
        return match rows.into_iter().next() {
            Some(row) => shape_entry(&row, &descriptor.fields),
            None => Ok(JsonValue::Null),
        };
    }
    rows.iter()
        .map(|row| shape_entry(row, &descriptor.fields))
        .collect::<Result<Vec<_>, _>>()
        .map(JsonValue::Array)
}

/// Template rows keep their column names, except that a single
/// column unwraps to its bare value
fn passthrough_row(row: Row) -> JsonValue {
    if row.len() == 1 {
        match row.into_iter().next() {
            Some((_, value)) => value,
            None => JsonValue::Null,
        }
    } else {
        JsonValue::Object(row)
    }
}

/// One row or one collected map entry, shaped member by member
fn shape_entry(entry: &Map<String, JsonValue>, fields: &[FieldShape]) -> Result<JsonValue, ShapeError> {
    let mut object = Map::new();
    for field in fields {
        let value = entry
            .get(&field.alias)
            .ok_or_else(|| ShapeError::MissingColumn(field.alias.clone()))?;
        let shaped = match &field.kind {
            FieldShapeKind::Scalar | FieldShapeKind::Computed => value.clone(),
            FieldShapeKind::Relationship { single, children } => {
                shape_relationship(&field.alias, value, *single, children)?
            }
        };
        object.insert(field.alias.clone(), shaped);
    }
    Ok(JsonValue::Object(object))
}

fn shape_relationship(
    column: &str,
    value: &JsonValue,
    single: bool,
    children: &[FieldShape],
) -> Result<JsonValue, ShapeError> {
    let JsonValue::Array(items) = value else {
        return Err(ShapeError::UnexpectedValue {
            column: column.to_string(),
            expected: "a list",
            found: value_name(value),
        });
    };
    let mut shaped = Vec::with_capacity(items.len());
    for item in items {
        let JsonValue::Object(entry) = item else {
            return Err(ShapeError::UnexpectedValue {
                column: column.to_string(),
                expected: "a map entry",
                found: value_name(item),
            });
        };
        shaped.push(shape_entry(entry, children)?);
    }
    if single {
        Ok(shaped.into_iter().next().unwrap_or(JsonValue::Null))
    } else {
        Ok(JsonValue::Array(shaped))
    }
}

fn value_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a map",
    }
}
