//! Substitution of `$variable` references in a selection tree.
//!
//! Operations arrive with `Value::Variable` placeholders; execution
//! requires every placeholder to be bound from the caller-supplied
//! variable map before compilation. Substitution is total: an
//! unresolved variable is an error, not a null.

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::graphql_ast::ast::{Argument, Directive, Field, Operation, Value};
use crate::store::ParamMap;

#[derive(Error, Debug)]
pub enum VariableError {
    #[error("Variable ${name} is not defined")]
    Unresolved { name: String },

    #[error("Variable ${name} has unsupported value type {found}")]
    Unsupported { name: String, found: &'static str },
}

/// Return a copy of the operation with every `Value::Variable` replaced
/// by its binding from `variables`
pub fn resolve_operation(
    operation: &Operation,
    variables: &ParamMap,
) -> Result<Operation, VariableError> {
    let fields = operation
        .fields
        .iter()
        .map(|f| resolve_field(f, variables))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Operation {
        name: operation.name.clone(),
        kind: operation.kind,
        fields,
    })
}

/// Resolve one field subtree. Exposed so callers can isolate a
/// resolution failure to a single top-level field.
pub fn resolve_field(field: &Field, variables: &ParamMap) -> Result<Field, VariableError> {
    Ok(Field {
        alias: field.alias.clone(),
        name: field.name.clone(),
        arguments: resolve_arguments(&field.arguments, variables)?,
        directives: field
            .directives
            .iter()
            .map(|d| {
                Ok(Directive {
                    name: d.name.clone(),
                    arguments: resolve_arguments(&d.arguments, variables)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        children: field
            .children
            .iter()
            .map(|c| resolve_field(c, variables))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn resolve_arguments(
    arguments: &[Argument],
    variables: &ParamMap,
) -> Result<Vec<Argument>, VariableError> {
    arguments
        .iter()
        .map(|a| {
            Ok(Argument {
                name: a.name.clone(),
                value: resolve_value(&a.value, variables)?,
            })
        })
        .collect()
}

fn resolve_value(value: &Value, variables: &ParamMap) -> Result<Value, VariableError> {
    match value {
        Value::Variable(name) => {
            let bound = variables
                .get(name)
                .ok_or_else(|| VariableError::Unresolved { name: name.clone() })?;
            json_to_value(name, bound)
        }
        Value::List(items) => Ok(Value::List(
            items
                .iter()
                .map(|v| resolve_value(v, variables))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        other => Ok(other.clone()),
    }
}

fn json_to_value(name: &str, json: &JsonValue) -> Result<Value, VariableError> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(VariableError::Unsupported {
                    name: name.to_string(),
                    found: "number",
                })
            }
        }
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(items) => Ok(Value::List(
            items
                .iter()
                .map(|v| json_to_value(name, v))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        JsonValue::Object(_) => Err(VariableError::Unsupported {
            name: name.to_string(),
            found: "object",
        }),
    }
}
