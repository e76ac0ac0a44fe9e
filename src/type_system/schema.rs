use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cypher_compiler::StatementKind;
use crate::entity_catalog::{EntityType, ScalarKind};
use crate::type_system::errors::TypeSystemError;

/// List-membership filter over the identifying property
/// (`id` property exposed as an `ids` argument)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsFilter {
    pub argument: String,
    pub property: String,
}

/// One `orderBy` token, e.g. `age_desc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderToken {
    pub property: String,
    pub descending: bool,
}

/// The argument surface generated for one entity kind. The same set
/// applies at the root field and on every relationship field that
/// yields this kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSet {
    /// Equality filters, one per non-array scalar property
    pub filters: BTreeMap<String, ScalarKind>,
    /// List-membership filter, present when an identifier exists
    pub ids_filter: Option<IdsFilter>,
    /// Valid `orderBy` tokens
    pub order_tokens: BTreeMap<String, OrderToken>,
}

impl ArgumentSet {
    /// Whether the given argument name belongs to this surface.
    /// `first`, `offset` and `orderBy` are accepted everywhere.
    pub fn accepts(&self, name: &str) -> bool {
        matches!(name, "first" | "offset" | "orderBy")
            || self.filters.contains_key(name)
            || self
                .ids_filter
                .as_ref()
                .is_some_and(|f| f.argument == name)
    }
}

/// One queryable type: the merged entity model plus its generated
/// argument surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub entity: EntityType,
    pub arguments: ArgumentSet,
}

/// An overlay-declared mutation root field, bound to its statement
/// template. Never inferred from the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationDef {
    pub name: String,
    pub arguments: BTreeMap<String, ScalarKind>,
    pub template: String,
    pub kind: StatementKind,
}

/// An immutable, versioned snapshot of everything a request can query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryableSchema {
    version: u64,
    types: BTreeMap<String, TypeDef>,
    mutations: BTreeMap<String, MutationDef>,
}

impl QueryableSchema {
    pub fn build(
        version: u64,
        types: BTreeMap<String, TypeDef>,
        mutations: BTreeMap<String, MutationDef>,
    ) -> Self {
        Self {
            version,
            types,
            mutations,
        }
    }

    pub fn empty() -> Self {
        Self::build(0, BTreeMap::new(), BTreeMap::new())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get_type(&self, name: &str) -> Result<&TypeDef, TypeSystemError> {
        self.types
            .get(name)
            .ok_or_else(|| TypeSystemError::UnknownType(name.to_string()))
    }

    pub fn get_type_opt(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn get_mutation_opt(&self, name: &str) -> Option<&MutationDef> {
        self.mutations.get(name)
    }

    pub fn types(&self) -> &BTreeMap<String, TypeDef> {
        &self.types
    }

    pub fn mutations(&self) -> &BTreeMap<String, MutationDef> {
        &self.mutations
    }
}
