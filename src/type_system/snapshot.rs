//! Atomic schema snapshots.
//!
//! Requests hold an `Arc<QueryableSchema>` for their whole lifetime;
//! the cell swaps whole snapshots, never exposing a half-built schema.
//! A failed rebuild leaves the previous snapshot installed.

use log::info;
use std::sync::{Arc, RwLock};

use crate::config::ScanOptions;
use crate::entity_catalog::{OverlaySchema, SchemaScanner};
use crate::store::GraphStore;
use crate::type_system::builder::SchemaBuilder;
use crate::type_system::errors::TypeSystemError;
use crate::type_system::schema::QueryableSchema;

pub struct SchemaCell {
    inner: RwLock<Arc<QueryableSchema>>,
}

impl SchemaCell {
    pub fn new(schema: QueryableSchema) -> Self {
        Self {
            inner: RwLock::new(Arc::new(schema)),
        }
    }

    /// The currently installed snapshot
    pub fn current(&self) -> Arc<QueryableSchema> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }

    /// Swap in a snapshot built elsewhere
    pub fn install(&self, schema: QueryableSchema) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(schema);
    }

    /// Scan the store, build the next snapshot, and install it.
    /// Returns the new version; on error the previous snapshot stays.
    pub fn rebuild(
        &self,
        store: &dyn GraphStore,
        overlay: Option<&OverlaySchema>,
        options: &ScanOptions,
    ) -> Result<u64, TypeSystemError> {
        let version = self.current().version() + 1;
        let models = SchemaScanner::scan(store, options)?;
        let schema = SchemaBuilder::build(version, models, overlay)?;
        info!(
            "Installing schema snapshot v{} ({} types, {} mutations)",
            version,
            schema.types().len(),
            schema.mutations().len()
        );
        self.install(schema);
        Ok(version)
    }
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::new(QueryableSchema::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MockGraphStore, StoreError};

    #[test]
    fn test_rebuild_installs_and_bumps_version() {
        let mut store = MockGraphStore::new();
        store.expect_entity_labels().returning(|| Ok(vec![]));
        store.expect_relationship_types().returning(|| Ok(vec![]));

        let cell = SchemaCell::default();
        assert_eq!(cell.current().version(), 0);

        let version = cell
            .rebuild(&store, None, &ScanOptions::default())
            .unwrap();
        assert_eq!(version, 1);
        assert_eq!(cell.current().version(), 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_snapshot() {
        let mut good = MockGraphStore::new();
        good.expect_entity_labels().returning(|| Ok(vec![]));
        good.expect_relationship_types().returning(|| Ok(vec![]));

        let cell = SchemaCell::default();
        cell.rebuild(&good, None, &ScanOptions::default()).unwrap();

        let mut bad = MockGraphStore::new();
        bad.expect_entity_labels()
            .returning(|| Err(StoreError::Connection("store is down".to_string())));

        let result = cell.rebuild(&bad, None, &ScanOptions::default());
        assert!(result.is_err());
        assert_eq!(cell.current().version(), 1);
    }

    #[test]
    fn test_in_flight_snapshot_survives_swap() {
        let cell = SchemaCell::default();
        let held = cell.current();

        cell.install(QueryableSchema::build(
            7,
            Default::default(),
            Default::default(),
        ));

        assert_eq!(held.version(), 0);
        assert_eq!(cell.current().version(), 7);
    }
}
