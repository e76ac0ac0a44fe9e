//! Building a [`QueryableSchema`] from scanned entity models merged
//! with an optional overlay.
//!
//! Overlay declarations take precedence over introspected members with
//! the same name, whatever member kind previously held it. Reverse
//! fields for overlay relationships are derived on the target type
//! unless the overlay declared its own entry for that relationship
//! type there.

use log::warn;
use std::collections::{BTreeMap, BTreeSet};

use crate::cypher_compiler::StatementKind;
use crate::entity_catalog::overlay::{OverlayRelationship, OverlaySchema};
use crate::entity_catalog::{
    ComputedField, EntityType, PropertyInfo, RelationshipInfo,
};
use crate::type_system::errors::TypeSystemError;
use crate::type_system::schema::{
    ArgumentSet, IdsFilter, MutationDef, OrderToken, QueryableSchema, TypeDef,
};
use crate::utils::naming;

pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Merge scanned models with the overlay and generate the
    /// argument surfaces
    pub fn build(
        version: u64,
        mut models: BTreeMap<String, EntityType>,
        overlay: Option<&OverlaySchema>,
    ) -> Result<QueryableSchema, TypeSystemError> {
        if let Some(overlay) = overlay {
            Self::apply_overlay(&mut models, overlay)?;
        }

        let types = models
            .into_iter()
            .map(|(name, entity)| {
                let arguments = Self::argument_set(&entity);
                (name, TypeDef { entity, arguments })
            })
            .collect();

        let mutations = overlay
            .map(Self::build_mutations)
            .unwrap_or_default();

        Ok(QueryableSchema::build(version, types, mutations))
    }

    fn apply_overlay(
        models: &mut BTreeMap<String, EntityType>,
        overlay: &OverlaySchema,
    ) -> Result<(), TypeSystemError> {
        // Declared relationships, kept for reverse derivation once
        // every overlay entity has been applied
        let mut declared: Vec<(String, OverlayRelationship)> = Vec::new();

        for (entity_name, decl) in &overlay.entities {
            let entity = models
                .entry(entity_name.clone())
                .or_insert_with(|| EntityType::new(entity_name.clone()));

            let mut claimed: BTreeSet<String> = BTreeSet::new();
            for property in &decl.properties {
                if !claimed.insert(property.name.clone()) {
                    return Err(TypeSystemError::DuplicateOverlayMember {
                        entity: entity_name.clone(),
                        member: property.name.clone(),
                    });
                }
                Self::displace(entity, &property.name);
                entity.properties.insert(
                    property.name.clone(),
                    PropertyInfo {
                        kind: property.kind,
                        is_array: property.array,
                        is_identifier: property.identifier,
                    },
                );
            }

            for relationship in &decl.relationships {
                if !claimed.insert(relationship.field.clone()) {
                    return Err(TypeSystemError::DuplicateOverlayMember {
                        entity: entity_name.clone(),
                        member: relationship.field.clone(),
                    });
                }
                Self::displace(entity, &relationship.field);
                entity.relationships.insert(
                    relationship.field.clone(),
                    RelationshipInfo {
                        field_name: relationship.field.clone(),
                        rel_type: relationship.rel_type.clone(),
                        target: relationship.target.clone(),
                        direction: relationship.direction,
                        this_end: relationship.this_end,
                        other_end: relationship.other_end,
                        template: relationship.template.clone(),
                        overridden: true,
                    },
                );
                declared.push((entity_name.clone(), relationship.clone()));
            }

            for computed in &decl.computed {
                if !claimed.insert(computed.name.clone()) {
                    return Err(TypeSystemError::DuplicateOverlayMember {
                        entity: entity_name.clone(),
                        member: computed.name.clone(),
                    });
                }
                Self::displace(entity, &computed.name);
                entity.computed.insert(
                    computed.name.clone(),
                    ComputedField {
                        name: computed.name.clone(),
                        arguments: computed.arguments.clone(),
                        template: computed.template.clone(),
                    },
                );
            }
        }

        for (source, relationship) in declared {
            Self::derive_reverse(models, &source, &relationship);
        }
        Ok(())
    }

    /// Remove whatever member currently holds `name`, so the overlay
    /// declaration replaces it outright
    fn displace(entity: &mut EntityType, name: &str) {
        entity.properties.remove(name);
        entity.relationships.remove(name);
        entity.computed.remove(name);
    }

    /// Mirror an overlay relationship onto its target type, unless the
    /// target already carries a field for that relationship type or
    /// the traversal is template-bound (templates are directional and
    /// have no mechanical reverse).
    fn derive_reverse(
        models: &mut BTreeMap<String, EntityType>,
        source: &str,
        relationship: &OverlayRelationship,
    ) {
        if relationship.template.is_some() || relationship.target == source {
            return;
        }
        let target = models
            .entry(relationship.target.clone())
            .or_insert_with(|| EntityType::new(relationship.target.clone()));
        if target
            .relationships
            .values()
            .any(|r| r.rel_type == relationship.rel_type)
        {
            return;
        }

        let mut field = naming::lower_camel(&relationship.rel_type);
        if target.has_member(&field) {
            let renamed = naming::disambiguate(&field, &relationship.rel_type);
            warn!(
                "Reverse field `{}` on `{}` is taken; exposing it as `{}`",
                field, target.name, renamed
            );
            field = renamed;
        }
        target.relationships.insert(
            field.clone(),
            RelationshipInfo {
                field_name: field,
                rel_type: relationship.rel_type.clone(),
                target: source.to_string(),
                direction: relationship.direction.reversed(),
                this_end: relationship.other_end,
                other_end: relationship.this_end,
                template: None,
                overridden: false,
            },
        );
    }

    /// Generate the argument surface for one entity: an equality
    /// filter per non-array scalar property, an ids filter over the
    /// identifier, and ordering tokens
    fn argument_set(entity: &EntityType) -> ArgumentSet {
        let mut filters = BTreeMap::new();
        let mut order_tokens = BTreeMap::new();

        for (name, info) in &entity.properties {
            if info.is_array {
                continue;
            }
            filters.insert(name.clone(), info.kind);
            order_tokens.insert(
                format!("{}_asc", name),
                OrderToken {
                    property: name.clone(),
                    descending: false,
                },
            );
            order_tokens.insert(
                format!("{}_desc", name),
                OrderToken {
                    property: name.clone(),
                    descending: true,
                },
            );
        }

        let ids_filter = entity.identifier().and_then(|(name, _)| {
            let argument = naming::pluralize(name);
            if filters.contains_key(&argument) {
                warn!(
                    "Ids argument `{}` on `{}` shadows a property filter; not exposing it",
                    argument, entity.name
                );
                return None;
            }
            Some(IdsFilter {
                argument,
                property: name.to_string(),
            })
        });

        ArgumentSet {
            filters,
            ids_filter,
            order_tokens,
        }
    }

    fn build_mutations(overlay: &OverlaySchema) -> BTreeMap<String, MutationDef> {
        overlay
            .mutations
            .iter()
            .map(|m| {
                (
                    m.name.clone(),
                    MutationDef {
                        name: m.name.clone(),
                        arguments: m.arguments.clone(),
                        template: m.template.clone(),
                        kind: StatementKind::classify(&m.template),
                    },
                )
            })
            .collect()
    }
}
