//! Optional overlay schema declarations loaded from YAML.
//!
//! The overlay refines or extends what the scanner inferred: extra
//! properties, templated or asymmetric relationships, computed fields,
//! and the mutation surface (mutations are never inferred).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::entity_catalog::errors::OverlayError;
use crate::entity_catalog::model::{Cardinality, Direction, ScalarKind};

/// Overlay declarations are YAML with the following structure:
///
/// ```yaml
/// entities:
///   Person:
///     properties:
///       - name: nickname
///         kind: string
///     relationships:
///       - field: employer
///         rel_type: WORKS_AT
///         target: Company
///         other_end: single
///     computed:
///       - name: score
///         arguments:
///           value: integer
///         template: "RETURN {value}"
/// mutations:
///   - name: createPerson
///     arguments:
///       name: string
///     template: "CREATE (p:Person {name: {name}}) RETURN p.name AS name"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlaySchema {
    #[serde(default)]
    pub entities: BTreeMap<String, OverlayEntity>,

    #[serde(default)]
    pub mutations: Vec<OverlayMutation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayEntity {
    #[serde(default)]
    pub properties: Vec<OverlayProperty>,

    #[serde(default)]
    pub relationships: Vec<OverlayRelationship>,

    #[serde(default)]
    pub computed: Vec<OverlayComputed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayProperty {
    pub name: String,
    pub kind: ScalarKind,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub identifier: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRelationship {
    pub field: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    #[serde(default = "default_cardinality")]
    pub this_end: Cardinality,
    #[serde(default = "default_cardinality")]
    pub other_end: Cardinality,
    /// Statement fragment replacing the plain relationship pattern
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayComputed {
    pub name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, ScalarKind>,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayMutation {
    pub name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, ScalarKind>,
    pub template: String,
}

fn default_direction() -> Direction {
    Direction::Out
}

fn default_cardinality() -> Cardinality {
    Cardinality::Multiple
}

impl OverlaySchema {
    /// Load overlay declarations from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, OverlayError> {
        let contents = fs::read_to_string(&path).map_err(|e| OverlayError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse overlay declarations from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, OverlayError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
