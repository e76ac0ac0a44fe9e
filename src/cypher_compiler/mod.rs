pub mod args;
pub mod compile;
pub mod errors;
pub mod statement;

pub use args::{bind_scope_args, FilterBinding, IdsBinding, ScopeArgs};
pub use compile::{compile_field, compile_operation, FieldCompilation};
pub use errors::CompileError;
pub use statement::{
    CompiledStatement, ExecutionMode, FieldShape, FieldShapeKind, ShapeDescriptor, StatementKind,
};
