use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::store::Direction;

/// Scalar kind of a property value. Arrays are expressed by
/// [`PropertyInfo::is_array`], not a distinct kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
}

/// How many counterparts one traversal step yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Multiple,
}

/// One property of an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub kind: ScalarKind,
    pub is_array: bool,
    pub is_identifier: bool,
}

impl PropertyInfo {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self {
            kind,
            is_array: false,
            is_identifier: false,
        }
    }
}

/// One relationship field exposed by an entity kind.
///
/// `other_end` is what the field yields (counterparts per declaring
/// instance); `this_end` is the reverse multiplicity. A templated
/// relationship traverses via its statement fragment instead of a
/// plain relationship pattern. `overridden` marks an explicit overlay
/// declaration whose reverse may deliberately not mirror it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipInfo {
    pub field_name: String,
    pub rel_type: String,
    pub target: String,
    pub direction: Direction,
    pub this_end: Cardinality,
    pub other_end: Cardinality,
    pub template: Option<String>,
    pub overridden: bool,
}

/// A derived scalar field backed by a statement template.
///
/// Template text uses `{argumentName}` placeholders and an implicit
/// `this` anchor bound to the enclosing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedField {
    pub name: String,
    pub arguments: BTreeMap<String, ScalarKind>,
    pub template: String,
}

/// One graph-entity kind: its properties, relationship fields, and
/// computed fields. The three name sets are disjoint; the scanner's
/// rename policy and the builder's overlay checks enforce that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub properties: BTreeMap<String, PropertyInfo>,
    pub relationships: BTreeMap<String, RelationshipInfo>,
    pub computed: BTreeMap<String, ComputedField>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
            relationships: BTreeMap::new(),
            computed: BTreeMap::new(),
        }
    }

    /// The identifying property, if one was discovered or declared
    pub fn identifier(&self) -> Option<(&str, &PropertyInfo)> {
        self.properties
            .iter()
            .find(|(_, info)| info.is_identifier)
            .map(|(name, info)| (name.as_str(), info))
    }

    /// Whether any member (property, relationship, or computed field)
    /// holds the given name
    pub fn has_member(&self, name: &str) -> bool {
        self.properties.contains_key(name)
            || self.relationships.contains_key(name)
            || self.computed.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_lookup() {
        let mut entity = EntityType::new("User");
        entity
            .properties
            .insert("name".to_string(), PropertyInfo::scalar(ScalarKind::String));
        entity.properties.insert(
            "id".to_string(),
            PropertyInfo {
                kind: ScalarKind::Integer,
                is_array: false,
                is_identifier: true,
            },
        );

        let (name, info) = entity.identifier().unwrap();
        assert_eq!(name, "id");
        assert_eq!(info.kind, ScalarKind::Integer);
    }

    #[test]
    fn test_has_member_spans_all_three_maps() {
        let mut entity = EntityType::new("User");
        entity
            .properties
            .insert("age".to_string(), PropertyInfo::scalar(ScalarKind::Integer));
        entity.computed.insert(
            "score".to_string(),
            ComputedField {
                name: "score".to_string(),
                arguments: BTreeMap::new(),
                template: "RETURN 1".to_string(),
            },
        );

        assert!(entity.has_member("age"));
        assert!(entity.has_member("score"));
        assert!(!entity.has_member("livesIn"));
    }
}
