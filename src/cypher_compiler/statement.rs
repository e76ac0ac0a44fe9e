//! Compiled-statement types: the traversal text, its parameters, the
//! shape descriptor the shaper consumes, and the read/write
//! classification.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::cypher_compiler::errors::CompileError;
use crate::graphql_ast::Directive;
use crate::store::ParamMap;

/// Regex matching write clauses at clause position. Keyword position
/// matters: a property reference like `v.create` must not match.
static WRITE_CLAUSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(CREATE|MERGE|DELETE|DETACH|SET|REMOVE|FOREACH|DROP)\b")
        .unwrap()
});

/// Whether a statement can change the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    ReadOnly,
    ReadWrite,
}

impl StatementKind {
    /// Classify by scanning the final statement text for write clauses
    pub fn classify(cypher: &str) -> Self {
        if WRITE_CLAUSE_PATTERN.is_match(cypher) {
            StatementKind::ReadWrite
        } else {
            StatementKind::ReadOnly
        }
    }
}

/// How one top-level field is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Execute and shape normally
    Normal,
    /// Plan-capturing execution; plan text goes to the backlog, no data
    Explain,
    /// Plan-capturing execution; plan text goes to the backlog
    /// alongside shaped data
    Profile,
    /// No execution at all; compiled text and classification go to the
    /// backlog
    CompileOnly,
}

impl ExecutionMode {
    /// Map the field's directives to a mode. The first mode directive
    /// wins; an unrecognized directive is an error.
    pub fn from_directives(directives: &[Directive]) -> Result<Self, CompileError> {
        let mut mode = ExecutionMode::Normal;
        for directive in directives {
            let chosen = match directive.name.as_str() {
                "explain" => ExecutionMode::Explain,
                "profile" => ExecutionMode::Profile,
                "compile" => ExecutionMode::CompileOnly,
                other => return Err(CompileError::UnknownDirective(other.to_string())),
            };
            if mode == ExecutionMode::Normal {
                mode = chosen;
            }
        }
        Ok(mode)
    }
}

/// Shape of one returned field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldShape {
    /// Response key, also the column or collected-map key
    pub alias: String,
    pub kind: FieldShapeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldShapeKind {
    Scalar,
    Computed,
    Relationship {
        /// Unwrap the collected list to one object or null
        single: bool,
        children: Vec<FieldShape>,
    },
}

/// Mapping from result rows back onto the selection shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    /// Root unwraps to a bare object (identifier equality filter)
    pub unwrap_single: bool,
    /// Rows pass through unmapped (mutations)
    pub passthrough: bool,
    pub fields: Vec<FieldShape>,
}

impl ShapeDescriptor {
    pub fn tree(unwrap_single: bool, fields: Vec<FieldShape>) -> Self {
        Self {
            unwrap_single,
            passthrough: false,
            fields,
        }
    }

    pub fn passthrough() -> Self {
        Self {
            unwrap_single: false,
            passthrough: true,
            fields: Vec::new(),
        }
    }
}

/// One executable traversal statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub cypher: String,
    pub parameters: ParamMap,
    pub shape: ShapeDescriptor,
    pub kind: StatementKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_read_only() {
        let cypher = "MATCH (user_1:User) WHERE user_1.name = $user_1_name \
                      RETURN user_1.name AS name";
        assert_eq!(StatementKind::classify(cypher), StatementKind::ReadOnly);
    }

    #[test]
    fn test_classify_write_clauses() {
        assert_eq!(
            StatementKind::classify("CREATE (u:User {name: $name}) RETURN u.name AS name"),
            StatementKind::ReadWrite
        );
        assert_eq!(
            StatementKind::classify("MATCH (u:User) SET u.age = $age RETURN u.age AS age"),
            StatementKind::ReadWrite
        );
        assert_eq!(
            StatementKind::classify("MATCH (u:User) DETACH DELETE u"),
            StatementKind::ReadWrite
        );
    }

    #[test]
    fn test_classify_ignores_property_references() {
        // Properties that merely spell like keywords stay read-only
        let cypher = "MATCH (v_1:Doc) RETURN v_1.create AS created, v_1.settings AS settings";
        assert_eq!(StatementKind::classify(cypher), StatementKind::ReadOnly);
    }

    #[test]
    fn test_mode_from_directives() {
        let explain = vec![Directive::new("explain")];
        assert_eq!(
            ExecutionMode::from_directives(&explain).unwrap(),
            ExecutionMode::Explain
        );

        let none: Vec<Directive> = vec![];
        assert_eq!(
            ExecutionMode::from_directives(&none).unwrap(),
            ExecutionMode::Normal
        );

        let unknown = vec![Directive::new("uppercase")];
        assert!(matches!(
            ExecutionMode::from_directives(&unknown),
            Err(CompileError::UnknownDirective(ref name)) if name == "uppercase"
        ));
    }

    #[test]
    fn test_statement_kind_serializes_screaming() {
        let json = serde_json::to_string(&StatementKind::ReadOnly).unwrap();
        assert_eq!(json, "\"READ_ONLY\"");
        let json = serde_json::to_string(&StatementKind::ReadWrite).unwrap();
        assert_eq!(json, "\"READ_WRITE\"");
    }
}
