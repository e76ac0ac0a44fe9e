//! Live-graph schema inference.
//!
//! The scanner samples instances of every entity kind through the
//! [`GraphStore`] introspection primitives and derives a typed model:
//! property kinds, the identifying property, relationship fields with
//! per-side cardinalities, and deterministic renames where field names
//! collide.

use log::{debug, info, warn};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::config::{ConflictPolicy, ScanOptions};
use crate::entity_catalog::errors::ScanError;
use crate::entity_catalog::model::{
    Cardinality, EntityType, PropertyInfo, RelationshipInfo, ScalarKind,
};
use crate::store::{Direction, GraphStore, NodeId};
use crate::utils::naming;

pub struct SchemaScanner;

impl SchemaScanner {
    /// Sample the live graph and return one [`EntityType`] per
    /// entity-kind label
    pub fn scan(
        store: &dyn GraphStore,
        options: &ScanOptions,
    ) -> Result<BTreeMap<String, EntityType>, ScanError> {
        options.validate()?;

        let labels = store.entity_labels()?;
        let mut models = BTreeMap::new();
        let mut sampled: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();

        for label in labels {
            let ids = store.sample_nodes(&label, options.sample_size)?;
            let entity = Self::scan_entity(store, &label, &ids, options)?;
            debug!(
                "Sampled {} instances of `{}`: {} properties",
                ids.len(),
                label,
                entity.properties.len()
            );
            sampled.insert(label.clone(), ids);
            models.insert(label, entity);
        }

        Self::scan_relationships(store, &sampled, &mut models)?;

        info!("Scanned {} entity kinds", models.len());
        Ok(models)
    }

    fn scan_entity(
        store: &dyn GraphStore,
        label: &str,
        ids: &[NodeId],
        options: &ScanOptions,
    ) -> Result<EntityType, ScanError> {
        let mut entity = EntityType::new(label);
        // Observed values per property, kept for identifier discovery
        let mut observed: BTreeMap<String, Vec<JsonValue>> = BTreeMap::new();

        for &id in ids {
            let row = store.node_properties(id)?;
            for (name, value) in &row {
                let Some((kind, is_array)) = Self::infer_value(value) else {
                    continue;
                };
                observed.entry(name.clone()).or_default().push(value.clone());
                match entity.properties.get_mut(name) {
                    None => {
                        entity.properties.insert(
                            name.clone(),
                            PropertyInfo {
                                kind,
                                is_array,
                                is_identifier: false,
                            },
                        );
                    }
                    Some(existing) => Self::merge_property(
                        label,
                        name,
                        existing,
                        kind,
                        is_array,
                        options.conflict_policy,
                    )?,
                }
            }
        }

        Self::discover_identifier(&mut entity, &observed, ids.len());
        Ok(entity)
    }

    /// Infer the scalar kind and array-ness of one sampled value.
    /// Nulls, empty arrays, and nested structures carry no kind
    /// evidence and are skipped.
    fn infer_value(value: &JsonValue) -> Option<(ScalarKind, bool)> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(_) => Some((ScalarKind::Boolean, false)),
            JsonValue::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Some((ScalarKind::Integer, false))
                } else {
                    Some((ScalarKind::Float, false))
                }
            }
            JsonValue::String(_) => Some((ScalarKind::String, false)),
            JsonValue::Array(items) => {
                let element = items.iter().find(|v| !v.is_null())?;
                match Self::infer_value(element) {
                    Some((kind, false)) => Some((kind, true)),
                    _ => None,
                }
            }
            JsonValue::Object(_) => None,
        }
    }

    fn merge_property(
        entity: &str,
        property: &str,
        existing: &mut PropertyInfo,
        kind: ScalarKind,
        is_array: bool,
        policy: ConflictPolicy,
    ) -> Result<(), ScanError> {
        if existing.kind != kind {
            match policy {
                ConflictPolicy::FirstWins => {
                    debug!(
                        "Keeping first-sampled kind {:?} for `{}.{}` (also sampled {:?})",
                        existing.kind, entity, property, kind
                    );
                }
                ConflictPolicy::Widen => {
                    existing.kind = Self::widen(existing.kind, kind);
                    existing.is_array = existing.is_array || is_array;
                }
                ConflictPolicy::Reject => {
                    return Err(ScanError::ScalarConflict {
                        entity: entity.to_string(),
                        property: property.to_string(),
                        first: existing.kind,
                        second: kind,
                    });
                }
            }
        } else if existing.is_array != is_array {
            match policy {
                ConflictPolicy::FirstWins => {}
                ConflictPolicy::Widen | ConflictPolicy::Reject => {
                    warn!(
                        "`{}.{}` sampled both as scalar and as array; treating as array",
                        entity, property
                    );
                    existing.is_array = true;
                }
            }
        }
        Ok(())
    }

    fn widen(a: ScalarKind, b: ScalarKind) -> ScalarKind {
        use ScalarKind::*;
        match (a, b) {
            (x, y) if x == y => x,
            (Integer, Float) | (Float, Integer) => Float,
            _ => String,
        }
    }

    /// Mark the identifying property: one literally named `id` wins;
    /// otherwise the first non-array property (in name order) that was
    /// present in every sample with pairwise-distinct values.
    fn discover_identifier(
        entity: &mut EntityType,
        observed: &BTreeMap<String, Vec<JsonValue>>,
        samples: usize,
    ) {
        if samples == 0 {
            return;
        }
        let chosen = if entity.properties.get("id").is_some_and(|p| !p.is_array) {
            Some("id".to_string())
        } else {
            entity
                .properties
                .iter()
                .filter(|(_, info)| !info.is_array)
                .find(|(name, _)| {
                    observed.get(name.as_str()).is_some_and(|values| {
                        values.len() == samples && Self::pairwise_distinct(values)
                    })
                })
                .map(|(name, _)| name.clone())
        };
        if let Some(name) = chosen {
            debug!("Identifier for `{}`: `{}`", entity.name, name);
            if let Some(info) = entity.properties.get_mut(&name) {
                info.is_identifier = true;
            }
        }
    }

    fn pairwise_distinct(values: &[JsonValue]) -> bool {
        for (i, a) in values.iter().enumerate() {
            if values[i + 1..].contains(a) {
                return false;
            }
        }
        true
    }

    fn scan_relationships(
        store: &dyn GraphStore,
        sampled: &BTreeMap<String, Vec<NodeId>>,
        models: &mut BTreeMap<String, EntityType>,
    ) -> Result<(), ScanError> {
        let bonds = store.relationship_types()?;
        let mut candidates: BTreeMap<String, Vec<RelationshipInfo>> = BTreeMap::new();

        for bond in bonds {
            if !models.contains_key(&bond.source) || !models.contains_key(&bond.target) {
                warn!(
                    "Skipping relationship type `{}`: endpoint kind not in the catalog",
                    bond.name
                );
                continue;
            }
            let field = naming::lower_camel(&bond.name);
            let out_card =
                Self::side_cardinality(store, sampled.get(&bond.source), &bond.name, Direction::Out)?;
            let in_card =
                Self::side_cardinality(store, sampled.get(&bond.target), &bond.name, Direction::In)?;

            candidates
                .entry(bond.source.clone())
                .or_default()
                .push(RelationshipInfo {
                    field_name: field.clone(),
                    rel_type: bond.name.clone(),
                    target: bond.target.clone(),
                    direction: Direction::Out,
                    this_end: in_card,
                    other_end: out_card,
                    template: None,
                    overridden: false,
                });
            // A self-referential type would mirror onto the same field
            // name; only the outgoing view is exposed for those.
            if bond.source != bond.target {
                candidates
                    .entry(bond.target.clone())
                    .or_default()
                    .push(RelationshipInfo {
                        field_name: field,
                        rel_type: bond.name.clone(),
                        target: bond.source.clone(),
                        direction: Direction::In,
                        this_end: out_card,
                        other_end: in_card,
                        template: None,
                        overridden: false,
                    });
            }
        }

        for (entity_name, mut entries) in candidates {
            if let Some(entity) = models.get_mut(&entity_name) {
                Self::place_relationships(entity, &mut entries);
            }
        }
        Ok(())
    }

    /// Whether any sampled instance reaches more than one counterpart
    /// over the given type and direction. No samples means no evidence
    /// of single-ness, so Multiple.
    fn side_cardinality(
        store: &dyn GraphStore,
        ids: Option<&Vec<NodeId>>,
        rel_type: &str,
        direction: Direction,
    ) -> Result<Cardinality, ScanError> {
        let ids = ids.map(|v| v.as_slice()).unwrap_or(&[]);
        if ids.is_empty() {
            return Ok(Cardinality::Multiple);
        }
        for &id in ids {
            if store.related_count(id, rel_type, direction)? > 1 {
                return Ok(Cardinality::Multiple);
            }
        }
        Ok(Cardinality::Single)
    }

    /// Insert relationship entries, renaming on collision. Properties
    /// keep the plain name; among relationships the lexicographically
    /// smaller type keeps it. Renamed entries get a `_<REL_TYPE>`
    /// suffix; nothing is dropped.
    fn place_relationships(entity: &mut EntityType, entries: &mut Vec<RelationshipInfo>) {
        entries.sort_by(|a, b| {
            a.field_name
                .cmp(&b.field_name)
                .then_with(|| a.rel_type.cmp(&b.rel_type))
                .then_with(|| a.target.cmp(&b.target))
        });

        for mut entry in entries.drain(..) {
            let plain = entry.field_name.clone();
            let mut name = plain.clone();

            if entity.properties.contains_key(&name) {
                name = naming::disambiguate(&plain, &entry.rel_type);
                warn!(
                    "Field `{}` on `{}` is taken by a property; exposing relationship `{}` as `{}`",
                    plain, entity.name, entry.rel_type, name
                );
            } else if entity.relationships.contains_key(&name) {
                name = naming::disambiguate(&plain, &entry.rel_type);
                warn!(
                    "Field `{}` on `{}` is shared by several relationship types; exposing `{}` as `{}`",
                    plain, entity.name, entry.rel_type, name
                );
            }
            // Same type toward several targets still needs a unique key
            if entity.relationships.contains_key(&name) || entity.properties.contains_key(&name) {
                let retried = format!("{}_{}", name, entry.target);
                warn!(
                    "Field `{}` on `{}` is still ambiguous; exposing it as `{}`",
                    name, entity.name, retried
                );
                name = retried;
            }

            entry.field_name = name.clone();
            entity.relationships.insert(name, entry);
        }
    }
}
