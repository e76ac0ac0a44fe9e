//! Error types for schema scanning and overlay loading.

use thiserror::Error;

use crate::config::ConfigError;
use crate::entity_catalog::model::ScalarKind;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scalar conflict on `{entity}.{property}`: sampled both {first:?} and {second:?}")]
    ScalarConflict {
        entity: String,
        property: String,
        first: ScalarKind,
        second: ScalarKind,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Failed to read overlay file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse overlay: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
