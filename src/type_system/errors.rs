//! Error types for type-system building and snapshot rebuilds.

use thiserror::Error;

use crate::entity_catalog::ScanError;

#[derive(Debug, Error)]
pub enum TypeSystemError {
    #[error("No type found for `{0}`")]
    UnknownType(String),

    #[error("Overlay declares `{entity}.{member}` more than once")]
    DuplicateOverlayMember { entity: String, member: String },

    #[error(transparent)]
    Scan(#[from] ScanError),
}
