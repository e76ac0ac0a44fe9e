//! The queryable type system: entity models merged with the overlay,
//! argument surfaces, and versioned atomic snapshots.

pub mod builder;
pub mod errors;
pub mod schema;
pub mod snapshot;

pub use builder::SchemaBuilder;
pub use errors::TypeSystemError;
pub use schema::{ArgumentSet, IdsFilter, MutationDef, OrderToken, QueryableSchema, TypeDef};
pub use snapshot::SchemaCell;
