//! Store abstraction: every interaction with the underlying property
//! graph goes through the [`GraphStore`] trait, so the rest of the
//! crate never sees a driver or a wire protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// One result row: column name to value, in projection order
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Statement parameters: parameter name to value
pub type ParamMap = serde_json::Map<String, serde_json::Value>;

/// Opaque node handle used by the introspection primitives
pub type NodeId = u64;

/// Traversal direction relative to a given node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }
}

/// A relationship-type label together with its endpoint entity kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelTypeBond {
    pub name: String,
    pub source: String,
    pub target: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store connection failure: {0}")]
    Connection(String),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Transaction failure: {0}")]
    Transaction(String),

    #[error("Introspection failure: {0}")]
    Introspection(String),
}

/// Synchronous access to a property-graph store.
///
/// `execute`/`execute_with_plan` run parameterized Cypher; the
/// remaining methods are the introspection primitives the schema
/// scanner samples the live graph with. Transactions are scoped by the
/// embedding host around a request; the executor itself never calls
/// them.
#[cfg_attr(test, automock)]
pub trait GraphStore {
    /// Run a parameterized statement and return its rows
    fn execute(&self, cypher: &str, params: &ParamMap) -> Result<Vec<Row>, StoreError>;

    /// Run a statement in plan-capturing mode, returning rows (empty
    /// for plan-only execution) plus the engine's plan text
    fn execute_with_plan(
        &self,
        cypher: &str,
        params: &ParamMap,
    ) -> Result<(Vec<Row>, String), StoreError>;

    fn begin_transaction(&self) -> Result<(), StoreError>;
    fn commit(&self) -> Result<(), StoreError>;
    fn rollback(&self) -> Result<(), StoreError>;

    /// All entity-kind labels present in the graph
    fn entity_labels(&self) -> Result<Vec<String>, StoreError>;

    /// All relationship-type labels with their endpoint kinds
    fn relationship_types(&self) -> Result<Vec<RelTypeBond>, StoreError>;

    /// Up to `limit` instances of the given entity kind
    fn sample_nodes(&self, label: &str, limit: usize) -> Result<Vec<NodeId>, StoreError>;

    /// The property map of one sampled instance
    fn node_properties(&self, id: NodeId) -> Result<Row, StoreError>;

    /// How many counterparts `id` reaches over `rel_type` in the given
    /// direction
    fn related_count(
        &self,
        id: NodeId,
        rel_type: &str,
        direction: Direction,
    ) -> Result<usize, StoreError>;
}
