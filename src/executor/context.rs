//! Per-request execution state: the store handle, the caller's
//! variable bindings and the diagnostics backlog.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::cypher_compiler::StatementKind;
use crate::store::{GraphStore, ParamMap, Row, StoreError};

/// Diagnostics recorded for one top-level field instead of, or next
/// to, its data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BacklogEntry {
    /// Planner output without execution
    Plan { plan: String },
    /// Planner output with runtime counters, rows were produced
    Profile { plan: String },
    /// The statement text itself, nothing was sent to the store
    Statement { cypher: String, kind: StatementKind },
}

/// Lives for exactly one request. Statements run through it so every
/// diagnostic ends up in the same backlog that the response reports.
pub struct ExecutionContext<'a> {
    store: &'a dyn GraphStore,
    variables: &'a ParamMap,
    backlog: BTreeMap<String, BacklogEntry>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(store: &'a dyn GraphStore, variables: &'a ParamMap) -> Self {
        Self {
            store,
            variables,
            backlog: BTreeMap::new(),
        }
    }

    pub fn variables(&self) -> &'a ParamMap {
        self.variables
    }

    pub fn run(&self, cypher: &str, parameters: &ParamMap) -> Result<Vec<Row>, StoreError> {
        self.store.execute(cypher, parameters)
    }

    pub fn run_with_plan(
        &self,
        cypher: &str,
        parameters: &ParamMap,
    ) -> Result<(Vec<Row>, String), StoreError> {
        self.store.execute_with_plan(cypher, parameters)
    }

    pub fn record(&mut self, alias: &str, entry: BacklogEntry) {
        self.backlog.insert(alias.to_string(), entry);
    }

    pub fn into_backlog(self) -> BTreeMap<String, BacklogEntry> {
        self.backlog
    }
}
