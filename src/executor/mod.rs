//! Drives one operation end to end.
//!
//! Every top-level field compiles on its own; each compiled statement
//! then runs according to its diagnostics mode, its rows are shaped,
//! and failures turn into per-field errors while sibling fields keep
//! their data.

pub mod context;
pub mod errors;

pub use context::{BacklogEntry, ExecutionContext};
pub use errors::{ErrorKind, FieldError};

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::cypher_compiler::{compile_operation, CompiledStatement, ExecutionMode};
use crate::graphql_ast::Operation;
use crate::result_shaper;
use crate::store::{GraphStore, ParamMap};
use crate::type_system::QueryableSchema;

/// The full outcome of one operation: data per top-level alias,
/// per-field errors, and diagnostics recorded by mode directives
#[derive(Debug, Default, Serialize)]
pub struct QueryResponse {
    pub data: Map<String, JsonValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub backlog: BTreeMap<String, BacklogEntry>,
}

impl QueryResponse {
    /// List results under a repeated alias concatenate; any other
    /// repetition lets the later field win
    fn merge_data(&mut self, alias: &str, value: JsonValue) {
        match (self.data.get_mut(alias), value) {
            (Some(JsonValue::Array(existing)), JsonValue::Array(mut incoming)) => {
                existing.append(&mut incoming);
            }
            (_, value) => {
                self.data.insert(alias.to_string(), value);
            }
        }
    }
}

/// Compile, execute and shape every top-level field of the operation.
/// Transactions are never touched here, the embedding host scopes
/// them around the whole request.
pub fn execute_operation(
    operation: &Operation,
    variables: &ParamMap,
    schema: &QueryableSchema,
    store: &dyn GraphStore,
) -> QueryResponse {
    let mut context = ExecutionContext::new(store, variables);
    let mut response = QueryResponse::default();

    for compilation in compile_operation(operation, variables, schema) {
        let alias = compilation.alias;
        let statement = match compilation.result {
            Ok(statement) => statement,
            Err(e) => {
                response
                    .errors
                    .push(FieldError::new(&alias, e.kind(), e.to_string()));
                continue;
            }
        };
        debug!("field `{}` compiled to:\n{}", alias, statement.cypher);
        match run_field(&mut context, &alias, compilation.mode, &statement) {
            Ok(value) => response.merge_data(&alias, value),
            Err(error) => response.errors.push(error),
        }
    }

    response.backlog = context.into_backlog();
    response
}

fn run_field(
    context: &mut ExecutionContext<'_>,
    alias: &str,
    mode: ExecutionMode,
    statement: &CompiledStatement,
) -> Result<JsonValue, FieldError> {
    match mode {
        ExecutionMode::Normal => {
            let rows = context
                .run(&statement.cypher, &statement.parameters)
                .map_err(|e| FieldError::new(alias, ErrorKind::Execution, e.to_string()))?;
            result_shaper::shape(rows, &statement.shape)
                .map_err(|e| FieldError::new(alias, ErrorKind::Execution, e.to_string()))
        }
        ExecutionMode::Explain => {
            let (_, plan) = context
                .run_with_plan(&format!("EXPLAIN {}", statement.cypher), &statement.parameters)
                .map_err(|e| FieldError::new(alias, ErrorKind::Execution, e.to_string()))?;
            context.record(alias, BacklogEntry::Plan { plan });
            Ok(JsonValue::Null)
        }
        ExecutionMode::Profile => {
            let (rows, plan) = context
                .run_with_plan(&format!("PROFILE {}", statement.cypher), &statement.parameters)
                .map_err(|e| FieldError::new(alias, ErrorKind::Execution, e.to_string()))?;
            context.record(alias, BacklogEntry::Profile { plan });
            result_shaper::shape(rows, &statement.shape)
                .map_err(|e| FieldError::new(alias, ErrorKind::Execution, e.to_string()))
        }
        ExecutionMode::CompileOnly => {
            context.record(
                alias,
                BacklogEntry::Statement {
                    cypher: statement.cypher.clone(),
                    kind: statement.kind,
                },
            );
            Ok(JsonValue::Null)
        }
    }
}
