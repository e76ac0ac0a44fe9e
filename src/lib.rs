//! GraftQL - GraphQL query layer for property-graph stores
//!
//! This crate compiles validated GraphQL-style selection trees into
//! parameterized Cypher traversal statements and shapes the resulting rows
//! back into selection-shaped JSON. It provides:
//! - Entity-model inference by sampling the live graph
//! - A queryable type system merged from inference and an optional overlay
//! - Per-field compilation with injection-safe parameter binding
//! - Result shaping with cardinality-aware unwrapping
//!
//! The graph database itself, the GraphQL parser, and any network surface
//! are external collaborators: the store is reached through the
//! [`store::GraphStore`] trait and the selection tree arrives as an already
//! validated [`graphql_ast::Operation`].

pub mod config;
pub mod cypher_compiler;
pub mod entity_catalog;
pub mod executor;
pub mod graphql_ast;
pub mod result_shaper;
pub mod store;
pub mod type_system;
pub mod utils;
