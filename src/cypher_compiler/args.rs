//! Validation and binding of the arguments given at one nesting scope.
//!
//! Every scope (root field or relationship field) accepts its target
//! type's argument surface. Binding checks names against that surface,
//! checks value kinds against the property kinds, and produces the
//! structured pieces the statement renderer turns into predicates,
//! ordering, and pagination.

use serde_json::Value as JsonValue;

use crate::cypher_compiler::errors::CompileError;
use crate::entity_catalog::ScalarKind;
use crate::graphql_ast::{Field, Value};
use crate::type_system::TypeDef;

/// One bound equality filter
#[derive(Debug, Clone)]
pub struct FilterBinding {
    pub property: String,
    pub argument: String,
    pub value: JsonValue,
}

/// A bound list-membership filter over the identifying property
#[derive(Debug, Clone)]
pub struct IdsBinding {
    pub argument: String,
    pub property: String,
    pub values: Vec<JsonValue>,
}

/// Everything one scope's arguments contribute to the statement
#[derive(Debug, Clone, Default)]
pub struct ScopeArgs {
    pub filters: Vec<FilterBinding>,
    pub ids: Option<IdsBinding>,
    /// (property, descending) in the order the tokens were given
    pub order: Vec<(String, bool)>,
    pub first: Option<i64>,
    pub offset: Option<i64>,
}

impl ScopeArgs {
    pub fn has_pagination(&self) -> bool {
        self.first.is_some() || self.offset.is_some()
    }

    /// Whether an equality filter targets the identifying property
    pub fn filters_identifier(&self, type_def: &TypeDef) -> bool {
        self.filters.iter().any(|f| {
            type_def
                .entity
                .properties
                .get(&f.property)
                .is_some_and(|p| p.is_identifier)
        })
    }
}

/// Validate and bind one field's arguments against its target type
pub fn bind_scope_args(field: &Field, type_def: &TypeDef) -> Result<ScopeArgs, CompileError> {
    let surface = &type_def.arguments;
    let mut args = ScopeArgs::default();

    for argument in &field.arguments {
        let name = argument.name.as_str();
        if !surface.accepts(name) {
            return Err(CompileError::UnknownArgument {
                field: field.output_name().to_string(),
                argument: name.to_string(),
            });
        }
        match name {
            "first" => args.first = Some(expect_count(name, &argument.value)?),
            "offset" => args.offset = Some(expect_count(name, &argument.value)?),
            "orderBy" => args.order = bind_order(type_def, &argument.value)?,
            _ => {
                let ids = surface.ids_filter.as_ref().filter(|f| f.argument == name);
                if let Some(ids) = ids {
                    let kind = type_def
                        .entity
                        .properties
                        .get(&ids.property)
                        .map(|p| p.kind)
                        .unwrap_or(ScalarKind::String);
                    args.ids = Some(IdsBinding {
                        argument: ids.argument.clone(),
                        property: ids.property.clone(),
                        values: bind_list(name, kind, &argument.value)?,
                    });
                } else {
                    // accepted and not ids/pagination/order, so an
                    // equality filter over a known property
                    let kind = surface.filters[name];
                    args.filters.push(FilterBinding {
                        property: name.to_string(),
                        argument: name.to_string(),
                        value: bind_scalar(name, kind, &argument.value)?,
                    });
                }
            }
        }
    }
    Ok(args)
}

fn expect_count(argument: &str, value: &Value) -> Result<i64, CompileError> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i),
        Value::Int(i) => Err(CompileError::Malformed {
            argument: argument.to_string(),
            message: format!("expects a non-negative integer, got {}", i),
        }),
        Value::Variable(name) => Err(CompileError::UnresolvedVariable(name.clone())),
        other => Err(CompileError::Malformed {
            argument: argument.to_string(),
            message: format!("expects a non-negative integer, got {}", value_kind(other)),
        }),
    }
}

fn bind_order(type_def: &TypeDef, value: &Value) -> Result<Vec<(String, bool)>, CompileError> {
    let tokens: Vec<&Value> = match value {
        Value::List(items) => items.iter().collect(),
        single => vec![single],
    };
    let mut order = Vec::with_capacity(tokens.len());
    for token in tokens {
        let name = match token {
            Value::Enum(name) | Value::String(name) => name,
            Value::Variable(name) => return Err(CompileError::UnresolvedVariable(name.clone())),
            other => {
                return Err(CompileError::Malformed {
                    argument: "orderBy".to_string(),
                    message: format!("expects ordering tokens, got {}", value_kind(other)),
                })
            }
        };
        let spec = type_def.arguments.order_tokens.get(name).ok_or_else(|| {
            CompileError::UnknownOrderToken {
                entity: type_def.entity.name.clone(),
                token: name.clone(),
            }
        })?;
        order.push((spec.property.clone(), spec.descending));
    }
    Ok(order)
}

fn bind_list(argument: &str, kind: ScalarKind, value: &Value) -> Result<Vec<JsonValue>, CompileError> {
    let items: Vec<&Value> = match value {
        Value::List(items) => items.iter().collect(),
        // single values coerce to one-element lists
        single => vec![single],
    };
    items
        .into_iter()
        .map(|item| bind_scalar(argument, kind, item))
        .collect()
}

pub(crate) fn bind_scalar(
    argument: &str,
    kind: ScalarKind,
    value: &Value,
) -> Result<JsonValue, CompileError> {
    if let Value::Variable(name) = value {
        return Err(CompileError::UnresolvedVariable(name.clone()));
    }
    let matches = matches!(
        (kind, value),
        (ScalarKind::Integer, Value::Int(_))
            | (ScalarKind::Float, Value::Float(_))
            | (ScalarKind::Float, Value::Int(_))
            | (ScalarKind::String, Value::String(_))
            | (ScalarKind::Boolean, Value::Boolean(_))
    );
    if !matches {
        return Err(CompileError::ArgumentType {
            argument: argument.to_string(),
            expected: format!("{:?}", kind),
            got: value_kind(value).to_string(),
        });
    }
    value.to_json().ok_or_else(|| CompileError::Malformed {
        argument: argument.to_string(),
        message: "value has no parameter representation".to_string(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Boolean(_) => "Boolean",
        Value::Int(_) => "Int",
        Value::Float(_) => "Float",
        Value::String(_) => "String",
        Value::Enum(_) => "Enum",
        Value::List(_) => "List",
        Value::Variable(_) => "Variable",
    }
}
