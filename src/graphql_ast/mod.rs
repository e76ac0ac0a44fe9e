pub mod ast;
pub mod variables;

pub use ast::{Argument, Directive, Field, Operation, OperationKind, Value};
pub use variables::{resolve_field, resolve_operation, VariableError};
