//! Per-field error reporting for operation execution.

use serde::Serialize;
use std::fmt;

/// Which stage of handling a field failed. Schema errors mean the
/// request does not fit the current type surface, compilation errors
/// mean the request itself is malformed, execution errors come from
/// the backing store or the shape of its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Schema,
    Compilation,
    Execution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Schema => write!(f, "schema"),
            ErrorKind::Compilation => write!(f, "compilation"),
            ErrorKind::Execution => write!(f, "execution"),
        }
    }
}

/// One failed top-level field. Other fields of the same operation
/// keep their results.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}
