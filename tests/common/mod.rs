//! In-memory graph fixture backing the integration tests.
//!
//! Introspection answers (labels, relationship bonds, samples,
//! property rows, degree counts) come from real stored nodes and
//! edges, so schema scanning runs against the same primitives it
//! would on a live store. Statement execution cannot interpret
//! Cypher; tests script the rows (and plans) each statement should
//! produce, consumed in call order.
#![allow(dead_code)]

use serde_json::{json, Value as JsonValue};
use std::cell::RefCell;
use std::collections::VecDeque;

use graftql::store::{Direction, GraphStore, NodeId, ParamMap, RelTypeBond, Row, StoreError};

struct MemoryNode {
    id: NodeId,
    label: String,
    properties: Row,
}

struct MemoryEdge {
    rel_type: String,
    from: NodeId,
    to: NodeId,
}

#[derive(Default)]
pub struct MemoryGraph {
    nodes: Vec<MemoryNode>,
    edges: Vec<MemoryEdge>,
    scripted_rows: RefCell<VecDeque<Vec<Row>>>,
    scripted_plans: RefCell<VecDeque<(Vec<Row>, String)>>,
    log: RefCell<Vec<(String, ParamMap)>>,
    transactions: RefCell<usize>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, label: &str, properties: JsonValue) -> NodeId {
        let JsonValue::Object(map) = properties else {
            panic!("node properties must be a map: {properties}");
        };
        let id = self.nodes.len() as NodeId + 1;
        self.nodes.push(MemoryNode {
            id,
            label: label.to_string(),
            properties: map,
        });
        id
    }

    pub fn add_edge(&mut self, rel_type: &str, from: NodeId, to: NodeId) {
        self.edges.push(MemoryEdge {
            rel_type: rel_type.to_string(),
            from,
            to,
        });
    }

    /// Queue rows for the next `execute` call
    pub fn script_rows(&self, rows: Vec<Row>) {
        self.scripted_rows.borrow_mut().push_back(rows);
    }

    /// Queue rows and plan text for the next `execute_with_plan` call
    pub fn script_plan(&self, rows: Vec<Row>, plan: &str) {
        self.scripted_plans
            .borrow_mut()
            .push_back((rows, plan.to_string()));
    }

    /// Every statement sent to the store, in order
    pub fn executed(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .map(|(cypher, _)| cypher.clone())
            .collect()
    }

    /// The parameters of the `index`-th executed statement
    pub fn parameters_of(&self, index: usize) -> ParamMap {
        self.log.borrow()[index].1.clone()
    }

    pub fn transaction_calls(&self) -> usize {
        *self.transactions.borrow()
    }

    fn label_of(&self, id: NodeId) -> Result<String, StoreError> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.label.clone())
            .ok_or_else(|| StoreError::Introspection(format!("no node with id {id}")))
    }
}

impl GraphStore for MemoryGraph {
    fn execute(&self, cypher: &str, params: &ParamMap) -> Result<Vec<Row>, StoreError> {
        self.log
            .borrow_mut()
            .push((cypher.to_string(), params.clone()));
        Ok(self.scripted_rows.borrow_mut().pop_front().unwrap_or_default())
    }

    fn execute_with_plan(
        &self,
        cypher: &str,
        params: &ParamMap,
    ) -> Result<(Vec<Row>, String), StoreError> {
        self.log
            .borrow_mut()
            .push((cypher.to_string(), params.clone()));
        Ok(self
            .scripted_plans
            .borrow_mut()
            .pop_front()
            .unwrap_or_default())
    }

    fn begin_transaction(&self) -> Result<(), StoreError> {
        *self.transactions.borrow_mut() += 1;
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        *self.transactions.borrow_mut() += 1;
        Ok(())
    }

    fn rollback(&self) -> Result<(), StoreError> {
        *self.transactions.borrow_mut() += 1;
        Ok(())
    }

    fn entity_labels(&self) -> Result<Vec<String>, StoreError> {
        let mut labels: Vec<String> = Vec::new();
        for node in &self.nodes {
            if !labels.contains(&node.label) {
                labels.push(node.label.clone());
            }
        }
        Ok(labels)
    }

    fn relationship_types(&self) -> Result<Vec<RelTypeBond>, StoreError> {
        let mut bonds: Vec<RelTypeBond> = Vec::new();
        for edge in &self.edges {
            let bond = RelTypeBond {
                name: edge.rel_type.clone(),
                source: self.label_of(edge.from)?,
                target: self.label_of(edge.to)?,
            };
            if !bonds.contains(&bond) {
                bonds.push(bond);
            }
        }
        Ok(bonds)
    }

    fn sample_nodes(&self, label: &str, limit: usize) -> Result<Vec<NodeId>, StoreError> {
        Ok(self
            .nodes
            .iter()
            .filter(|node| node.label == label)
            .take(limit)
            .map(|node| node.id)
            .collect())
    }

    fn node_properties(&self, id: NodeId) -> Result<Row, StoreError> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.properties.clone())
            .ok_or_else(|| StoreError::Introspection(format!("no node with id {id}")))
    }

    fn related_count(
        &self,
        id: NodeId,
        rel_type: &str,
        direction: Direction,
    ) -> Result<usize, StoreError> {
        Ok(self
            .edges
            .iter()
            .filter(|edge| {
                edge.rel_type == rel_type
                    && match direction {
                        Direction::Out => edge.from == id,
                        Direction::In => edge.to == id,
                    }
            })
            .count())
    }
}

/// Five users living in one Location, ids 1 through 5, ages 39
/// through 43
pub fn berlin() -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    let berlin = graph.add_node("Location", json!({"name": "Berlin"}));
    for id in 1..=5i64 {
        let user = graph.add_node(
            "User",
            json!({"id": id, "name": format!("John {id}"), "age": 38 + id}),
        );
        graph.add_edge("LIVES_IN", user, berlin);
    }
    graph
}

pub fn row(value: JsonValue) -> Row {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("not a row: {other}"),
    }
}
