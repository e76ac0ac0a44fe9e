//! Entity catalog: the typed model of the graph's entity kinds, the
//! scanner that infers it from a live store, and the optional overlay
//! declarations that refine it.

pub mod errors;
pub mod model;
pub mod overlay;
pub mod scanner;

pub use errors::{OverlayError, ScanError};
pub use model::{
    Cardinality, ComputedField, Direction, EntityType, PropertyInfo, RelationshipInfo, ScalarKind,
};
pub use overlay::OverlaySchema;
pub use scanner::SchemaScanner;
