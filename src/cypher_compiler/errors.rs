//! Compiler error types and their reporting classification.

use thiserror::Error;

use crate::executor::errors::ErrorKind;
use crate::graphql_ast::VariableError;
use crate::type_system::TypeSystemError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Unknown top-level field `{0}`")]
    UnknownField(String),

    #[error("Unknown field `{field}` on type `{entity}`")]
    UnknownMember { entity: String, field: String },

    #[error("Unknown argument `{argument}` on `{field}`")]
    UnknownArgument { field: String, argument: String },

    #[error("Argument `{argument}` expects {expected}, got {got}")]
    ArgumentType {
        argument: String,
        expected: String,
        got: String,
    },

    #[error("Unknown ordering token `{token}` for type `{entity}`")]
    UnknownOrderToken { entity: String, token: String },

    #[error("Unknown directive `@{0}`")]
    UnknownDirective(String),

    #[error("Variable ${0} is not resolved")]
    UnresolvedVariable(String),

    #[error("Malformed argument `{argument}`: {message}")]
    Malformed { argument: String, message: String },

    #[error("Field `{0}` is a scalar and takes no selection")]
    ScalarSelection(String),

    #[error("Field `{0}` yields entities and needs a selection")]
    MissingSelection(String),

    #[error("Name `{0}` is not safe to interpolate")]
    UnsafeIdentifier(String),

    #[error(transparent)]
    Schema(#[from] TypeSystemError),
}

impl From<VariableError> for CompileError {
    fn from(e: VariableError) -> Self {
        match e {
            VariableError::Unresolved { name } => CompileError::UnresolvedVariable(name),
            VariableError::Unsupported { name, found } => CompileError::Malformed {
                argument: name,
                message: format!("unsupported variable value type {}", found),
            },
        }
    }
}

impl CompileError {
    /// Reporting class for per-field errors: schema-surface mismatches
    /// versus malformed requests
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnknownField(_)
            | CompileError::UnknownMember { .. }
            | CompileError::UnknownArgument { .. }
            | CompileError::ArgumentType { .. }
            | CompileError::UnknownOrderToken { .. }
            | CompileError::UnknownDirective(_)
            | CompileError::ScalarSelection(_)
            | CompileError::MissingSelection(_)
            | CompileError::UnsafeIdentifier(_)
            | CompileError::Schema(_) => ErrorKind::Schema,
            CompileError::UnresolvedVariable(_) | CompileError::Malformed { .. } => {
                ErrorKind::Compilation
            }
        }
    }
}
