//! Selection-tree to traversal-statement compilation.
//!
//! One top-level field compiles to one statement. The anchor `MATCH`
//! carries the scope's predicates; ordering and pagination render as a
//! `WITH` block at exactly the nesting level their arguments were
//! given; every relationship child becomes a `CALL` subquery returning
//! a collected list, so child scopes never leak limits or ordering
//! into their parents. Argument values always bind as named
//! parameters, never as literal text.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::cypher_compiler::args::{bind_scalar, bind_scope_args, ScopeArgs};
use crate::cypher_compiler::errors::CompileError;
use crate::cypher_compiler::statement::{
    CompiledStatement, ExecutionMode, FieldShape, FieldShapeKind, ShapeDescriptor, StatementKind,
};
use crate::entity_catalog::{Cardinality, ComputedField, Direction, RelationshipInfo, ScalarKind};
use crate::graphql_ast::{resolve_field, Field, Operation, OperationKind};
use crate::store::ParamMap;
use crate::type_system::{MutationDef, QueryableSchema, TypeDef, TypeSystemError};
use crate::utils::naming;

/// `{argumentName}` placeholders in traversal templates
static TEMPLATE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// The compilation outcome of one top-level field. Failures stay
/// isolated per field.
#[derive(Debug)]
pub struct FieldCompilation {
    pub alias: String,
    pub mode: ExecutionMode,
    pub result: Result<CompiledStatement, CompileError>,
}

/// Compile every top-level field of an operation, resolving variable
/// references per field so one bad binding fails only its own field
pub fn compile_operation(
    operation: &Operation,
    variables: &ParamMap,
    schema: &QueryableSchema,
) -> Vec<FieldCompilation> {
    operation
        .fields
        .iter()
        .map(|field| {
            let alias = field.output_name().to_string();
            let resolved = match resolve_field(field, variables) {
                Ok(resolved) => resolved,
                Err(e) => {
                    return FieldCompilation {
                        alias,
                        mode: ExecutionMode::Normal,
                        result: Err(e.into()),
                    }
                }
            };
            let mode = match ExecutionMode::from_directives(&resolved.directives) {
                Ok(mode) => mode,
                Err(e) => {
                    return FieldCompilation {
                        alias,
                        mode: ExecutionMode::Normal,
                        result: Err(e),
                    }
                }
            };
            FieldCompilation {
                alias,
                mode,
                result: compile_field(&resolved, operation.kind, schema),
            }
        })
        .collect()
}

/// Compile a single top-level field with already-resolved arguments
pub fn compile_field(
    field: &Field,
    kind: OperationKind,
    schema: &QueryableSchema,
) -> Result<CompiledStatement, CompileError> {
    let compiler = Compiler::new(schema);
    match kind {
        OperationKind::Mutation => {
            let mutation = schema
                .get_mutation_opt(&field.name)
                .ok_or_else(|| CompileError::UnknownField(field.name.clone()))?;
            compiler.compile_mutation(field, mutation)
        }
        OperationKind::Query => {
            let type_def = schema
                .get_type_opt(&field.name)
                .ok_or_else(|| CompileError::UnknownField(field.name.clone()))?;
            compiler.compile_root(field, type_def)
        }
    }
}

struct Compiler<'a> {
    schema: &'a QueryableSchema,
    params: ParamMap,
    counter: usize,
}

impl<'a> Compiler<'a> {
    fn new(schema: &'a QueryableSchema) -> Self {
        Self {
            schema,
            params: ParamMap::new(),
            counter: 0,
        }
    }

    fn target_type(&self, name: &str) -> Result<&'a TypeDef, CompileError> {
        self.schema
            .get_type_opt(name)
            .ok_or_else(|| CompileError::Schema(TypeSystemError::UnknownType(name.to_string())))
    }

    /// Fresh traversal variable, unique across every scope of this
    /// statement
    fn fresh_var(&mut self, entity: &str) -> String {
        self.counter += 1;
        format!("{}_{}", entity.to_lowercase(), self.counter)
    }

    /// Fresh value binding, sharing the same counter so it can never
    /// collide with a traversal variable
    fn fresh_binding(&mut self, base: &str) -> String {
        self.counter += 1;
        format!("{}_{}", base, self.counter)
    }

    fn compile_root(
        mut self,
        field: &Field,
        type_def: &'a TypeDef,
    ) -> Result<CompiledStatement, CompileError> {
        if field.children.is_empty() {
            return Err(CompileError::MissingSelection(
                field.output_name().to_string(),
            ));
        }
        let args = bind_scope_args(field, type_def)?;
        let var = self.fresh_var(&type_def.entity.name);
        let label = safe_name(&type_def.entity.name)?;

        let mut lines: Vec<String> = Vec::new();
        if let Some(ids) = &args.ids {
            let param = self.bind_value_param(&var, &ids.argument, JsonValue::Array(ids.values.clone()));
            lines.push(format!("UNWIND ${} AS {}_key", param, var));
        }
        lines.push(format!("MATCH ({}:{})", var, label));
        if let Some(predicates) = self.render_predicates(&var, &args, true)? {
            lines.push(format!("WHERE {}", predicates));
        }
        self.push_scope_tail(&mut lines, 0, &var, &args, false)?;

        let (pairs, shapes) = self.compile_selection(&mut lines, 0, field, type_def, &var)?;
        let projection = pairs
            .iter()
            .map(|(alias, expr)| format!("{} AS {}", expr, alias))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("RETURN {}", projection));

        let unwrap_single = args.filters_identifier(type_def);
        let cypher = lines.join("\n");
        let kind = StatementKind::classify(&cypher);
        Ok(CompiledStatement {
            cypher,
            parameters: self.params,
            shape: ShapeDescriptor::tree(unwrap_single, shapes),
            kind,
        })
    }

    fn compile_mutation(
        mut self,
        field: &Field,
        mutation: &'a MutationDef,
    ) -> Result<CompiledStatement, CompileError> {
        let cypher = self.bind_template(&mutation.template, &mutation.arguments, field, None)?;
        Ok(CompiledStatement {
            cypher,
            parameters: self.params,
            shape: ShapeDescriptor::passthrough(),
            kind: mutation.kind,
        })
    }

    /// Project one scope's children: scalar reads inline, computed
    /// fields and relationships as `CALL` blocks whose bindings the
    /// projection then references
    fn compile_selection(
        &mut self,
        lines: &mut Vec<String>,
        depth: usize,
        field: &Field,
        type_def: &'a TypeDef,
        var: &str,
    ) -> Result<(Vec<(String, String)>, Vec<FieldShape>), CompileError> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut shapes: Vec<FieldShape> = Vec::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();

        for child in &field.children {
            let alias = child.output_name();
            safe_name(alias)?;
            if !seen.insert(alias) {
                return Err(CompileError::Malformed {
                    argument: alias.to_string(),
                    message: "duplicate alias within one selection".to_string(),
                });
            }
            if !child.directives.is_empty() {
                return Err(CompileError::Malformed {
                    argument: child.directives[0].name.clone(),
                    message: "directives apply to top-level fields only".to_string(),
                });
            }

            let entity = &type_def.entity;
            if let Some(_property) = entity.properties.get(&child.name) {
                if !child.children.is_empty() {
                    return Err(CompileError::ScalarSelection(child.name.clone()));
                }
                if let Some(argument) = child.arguments.first() {
                    return Err(CompileError::UnknownArgument {
                        field: alias.to_string(),
                        argument: argument.name.clone(),
                    });
                }
                pairs.push((alias.to_string(), format!("{}.{}", var, safe_name(&child.name)?)));
                shapes.push(FieldShape {
                    alias: alias.to_string(),
                    kind: FieldShapeKind::Scalar,
                });
            } else if let Some(computed) = entity.computed.get(&child.name) {
                if !child.children.is_empty() {
                    return Err(CompileError::ScalarSelection(child.name.clone()));
                }
                let binding = self.compile_computed(lines, depth, child, computed, var)?;
                pairs.push((alias.to_string(), binding));
                shapes.push(FieldShape {
                    alias: alias.to_string(),
                    kind: FieldShapeKind::Computed,
                });
            } else if let Some(relationship) = entity.relationships.get(&child.name) {
                if child.children.is_empty() {
                    return Err(CompileError::MissingSelection(child.name.clone()));
                }
                let (binding, children) =
                    self.compile_relationship(lines, depth, child, relationship, var)?;
                pairs.push((alias.to_string(), binding));
                shapes.push(FieldShape {
                    alias: alias.to_string(),
                    kind: FieldShapeKind::Relationship {
                        single: relationship.other_end == Cardinality::Single,
                        children,
                    },
                });
            } else {
                return Err(CompileError::UnknownMember {
                    entity: entity.name.clone(),
                    field: child.name.clone(),
                });
            }
        }
        Ok((pairs, shapes))
    }

    /// One relationship child: a `CALL` subquery that traverses,
    /// filters, orders and paginates in its own scope, then returns
    /// the collected result under a fresh binding
    fn compile_relationship(
        &mut self,
        lines: &mut Vec<String>,
        depth: usize,
        child: &Field,
        relationship: &'a RelationshipInfo,
        parent_var: &str,
    ) -> Result<(String, Vec<FieldShape>), CompileError> {
        let target = self.target_type(&relationship.target)?;
        let args = bind_scope_args(child, target)?;
        let var = self.fresh_var(&target.entity.name);
        let binding = self.fresh_binding(child.output_name());
        let pad = indent(depth);
        let inner = indent(depth + 1);

        lines.push(format!("{}CALL {{", pad));
        lines.push(format!("{}WITH {}", inner, parent_var));

        match &relationship.template {
            None => {
                if let Some(ids) = &args.ids {
                    let param = self.bind_value_param(
                        &var,
                        &ids.argument,
                        JsonValue::Array(ids.values.clone()),
                    );
                    lines.push(format!("{}UNWIND ${} AS {}_key", inner, param, var));
                }
                lines.push(format!(
                    "{}MATCH ({}){}({}:{})",
                    inner,
                    parent_var,
                    render_arrow(relationship)?,
                    var,
                    safe_name(&target.entity.name)?
                ));
                if let Some(predicates) = self.render_predicates(&var, &args, true)? {
                    lines.push(format!("{}WHERE {}", inner, predicates));
                }
            }
            Some(template) => {
                // Template-bound traversal: anchor the template's
                // `this` and alias its returned expression. The
                // child's own arguments stay scope arguments, so the
                // template itself takes none.
                if let Some(found) = TEMPLATE_PLACEHOLDER.find(template) {
                    return Err(CompileError::Malformed {
                        argument: found.as_str().trim_matches(['{', '}']).to_string(),
                        message: "relationship templates take no arguments".to_string(),
                    });
                }
                lines.push(format!("{}WITH {} AS this", inner, parent_var));
                lines.push(format!("{}CALL {{", inner));
                lines.push(format!("{}WITH this", indent(depth + 2)));
                lines.push(format!("{}{} AS {}", indent(depth + 2), template, var));
                lines.push(format!("{}}}", inner));
                if let Some(predicates) = self.render_predicates(&var, &args, false)? {
                    lines.push(format!("{}WITH {} WHERE {}", inner, var, predicates));
                }
            }
        }

        let implicit_single =
            relationship.other_end == Cardinality::Single && !args.has_pagination();
        self.push_scope_tail(lines, depth + 1, &var, &args, implicit_single)?;

        let (pairs, shapes) = self.compile_selection(lines, depth + 1, child, target, &var)?;
        let entries = pairs
            .iter()
            .map(|(alias, expr)| format!("{}: {}", alias, expr))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "{}RETURN collect({{{}}}) AS {}",
            inner, entries, binding
        ));
        lines.push(format!("{}}}", pad));
        Ok((binding, shapes))
    }

    /// One computed child: a `CALL` subquery anchoring `this` and
    /// aliasing the template's value to a fresh binding
    fn compile_computed(
        &mut self,
        lines: &mut Vec<String>,
        depth: usize,
        child: &Field,
        computed: &'a ComputedField,
        parent_var: &str,
    ) -> Result<String, CompileError> {
        let binding = self.fresh_binding(child.output_name());
        let bound =
            self.bind_template(&computed.template, &computed.arguments, child, Some(binding.as_str()))?;
        let pad = indent(depth);
        let inner = indent(depth + 1);
        lines.push(format!("{}CALL {{", pad));
        lines.push(format!("{}WITH {}", inner, parent_var));
        lines.push(format!("{}WITH {} AS this", inner, parent_var));
        lines.push(format!("{}{} AS {}", inner, bound, binding));
        lines.push(format!("{}}}", pad));
        Ok(binding)
    }

    /// Replace `{arg}` placeholders with named parameters, validating
    /// the field's arguments against the declared signature
    fn bind_template(
        &mut self,
        template: &str,
        signature: &BTreeMap<String, ScalarKind>,
        field: &Field,
        prefix: Option<&str>,
    ) -> Result<String, CompileError> {
        for argument in &field.arguments {
            if !signature.contains_key(&argument.name) {
                return Err(CompileError::UnknownArgument {
                    field: field.output_name().to_string(),
                    argument: argument.name.clone(),
                });
            }
        }

        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in TEMPLATE_PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let arg_name = name.as_str();
            let Some(&kind) = signature.get(arg_name) else {
                return Err(CompileError::Malformed {
                    argument: arg_name.to_string(),
                    message: "template references an undeclared argument".to_string(),
                });
            };
            let value = field
                .get_argument(arg_name)
                .ok_or_else(|| CompileError::Malformed {
                    argument: arg_name.to_string(),
                    message: "required by the template but not provided".to_string(),
                })?;
            let bound = bind_scalar(arg_name, kind, value)?;
            let param = match prefix {
                Some(p) => format!("{}_{}", p, arg_name),
                None => arg_name.to_string(),
            };
            out.push_str(&template[last..whole.start()]);
            out.push('$');
            out.push_str(&param);
            self.params.insert(param, bound);
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }

    /// Equality and ids predicates for one scope, parameters bound.
    /// With `ids_as_key` the caller unwinds the list first and the
    /// predicate equates against the unwound key, preserving input
    /// order; otherwise the list binds as a membership check.
    fn render_predicates(
        &mut self,
        var: &str,
        args: &ScopeArgs,
        ids_as_key: bool,
    ) -> Result<Option<String>, CompileError> {
        let mut predicates = Vec::new();
        if let Some(ids) = &args.ids {
            if ids_as_key {
                predicates.push(format!("{}.{} = {}_key", var, safe_name(&ids.property)?, var));
            } else {
                let param = self.bind_value_param(
                    var,
                    &ids.argument,
                    JsonValue::Array(ids.values.clone()),
                );
                predicates.push(format!("{}.{} IN ${}", var, safe_name(&ids.property)?, param));
            }
        }
        for filter in &args.filters {
            let param = self.bind_value_param(var, &filter.argument, filter.value.clone());
            predicates.push(format!("{}.{} = ${}", var, safe_name(&filter.property)?, param));
        }
        if predicates.is_empty() {
            Ok(None)
        } else {
            Ok(Some(predicates.join(" AND ")))
        }
    }

    /// Ordering and pagination for one scope: `WITH v [ORDER BY ...]
    /// [SKIP $..] [LIMIT $..]`, or an implicit `LIMIT 1` for
    /// single-cardinality children without explicit pagination
    fn push_scope_tail(
        &mut self,
        lines: &mut Vec<String>,
        depth: usize,
        var: &str,
        args: &ScopeArgs,
        implicit_single: bool,
    ) -> Result<(), CompileError> {
        if args.order.is_empty() && !args.has_pagination() && !implicit_single {
            return Ok(());
        }
        let mut clause = format!("{}WITH {}", indent(depth), var);
        if !args.order.is_empty() {
            let keys = args
                .order
                .iter()
                .map(|(property, descending)| {
                    Ok(format!(
                        "{}.{} {}",
                        var,
                        safe_name(property)?,
                        if *descending { "DESC" } else { "ASC" }
                    ))
                })
                .collect::<Result<Vec<_>, CompileError>>()?
                .join(", ");
            clause.push_str(&format!(" ORDER BY {}", keys));
        }
        if let Some(offset) = args.offset {
            let param = self.bind_value_param(var, "offset", JsonValue::from(offset));
            clause.push_str(&format!(" SKIP ${}", param));
        }
        if let Some(first) = args.first {
            let param = self.bind_value_param(var, "first", JsonValue::from(first));
            clause.push_str(&format!(" LIMIT ${}", param));
        } else if implicit_single {
            clause.push_str(" LIMIT 1");
        }
        lines.push(clause);
        Ok(())
    }

    /// Insert a `<var>_<argument>` parameter and return its name
    fn bind_value_param(&mut self, var: &str, argument: &str, value: JsonValue) -> String {
        let param = format!("{}_{}", var, argument);
        self.params.insert(param.clone(), value);
        param
    }
}

fn render_arrow(relationship: &RelationshipInfo) -> Result<String, CompileError> {
    let rel_type = safe_name(&relationship.rel_type)?;
    Ok(match relationship.direction {
        Direction::Out => format!("-[:{}]->", rel_type),
        Direction::In => format!("<-[:{}]-", rel_type),
    })
}

/// Schema-provided names are interpolated into statement text, so they
/// must be plain identifiers
fn safe_name(name: &str) -> Result<&str, CompileError> {
    if naming::is_safe_identifier(name) {
        Ok(name)
    } else {
        Err(CompileError::UnsafeIdentifier(name.to_string()))
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_catalog::{EntityType, OverlaySchema, PropertyInfo};
    use crate::graphql_ast::{Directive, Value};
    use crate::type_system::SchemaBuilder;
    use serde_json::json;

    fn berlin_schema() -> QueryableSchema {
        let mut user = EntityType::new("User");
        user.properties.insert(
            "id".to_string(),
            PropertyInfo {
                kind: ScalarKind::Integer,
                is_array: false,
                is_identifier: true,
            },
        );
        user.properties
            .insert("name".to_string(), PropertyInfo::scalar(ScalarKind::String));
        user.properties
            .insert("age".to_string(), PropertyInfo::scalar(ScalarKind::Integer));
        user.relationships.insert(
            "livesIn".to_string(),
            RelationshipInfo {
                field_name: "livesIn".to_string(),
                rel_type: "LIVES_IN".to_string(),
                target: "Location".to_string(),
                direction: Direction::Out,
                this_end: Cardinality::Multiple,
                other_end: Cardinality::Single,
                template: None,
                overridden: false,
            },
        );

        let mut location = EntityType::new("Location");
        location.properties.insert(
            "name".to_string(),
            PropertyInfo {
                kind: ScalarKind::String,
                is_array: false,
                is_identifier: true,
            },
        );
        location.relationships.insert(
            "livesIn".to_string(),
            RelationshipInfo {
                field_name: "livesIn".to_string(),
                rel_type: "LIVES_IN".to_string(),
                target: "User".to_string(),
                direction: Direction::In,
                this_end: Cardinality::Single,
                other_end: Cardinality::Multiple,
                template: None,
                overridden: false,
            },
        );

        let overlay = OverlaySchema::from_yaml_str(
            r#"
entities:
  User:
    relationships:
      - field: neighbours
        rel_type: LIVES_IN
        target: User
        template: "MATCH (this)-[:LIVES_IN]->(:Location)<-[:LIVES_IN]-(other:User) RETURN other"
      - field: broken
        rel_type: X
        target: User
        template: "MATCH (this)-[:X]->(w {k: {key}}) RETURN w"
    computed:
      - name: score
        arguments:
          value: integer
        template: "RETURN {value}"
mutations:
  - name: createUser
    arguments:
      name: string
    template: "CREATE (u:User {name: {name}}) RETURN u.name AS name"
"#,
        )
        .unwrap();

        let mut models = std::collections::BTreeMap::new();
        models.insert("User".to_string(), user);
        models.insert("Location".to_string(), location);
        SchemaBuilder::build(1, models, Some(&overlay)).unwrap()
    }

    fn compile_query(field: Field) -> CompiledStatement {
        compile_field(&field, OperationKind::Query, &berlin_schema()).unwrap()
    }

    #[test]
    fn test_plain_root_selection() {
        let statement = compile_query(
            Field::new("User")
                .child(Field::new("id"))
                .child(Field::new("name")),
        );
        assert!(statement.cypher.contains("MATCH (user_1:User)"));
        assert!(statement
            .cypher
            .contains("RETURN user_1.id AS id, user_1.name AS name"));
        assert!(statement.parameters.is_empty());
        assert_eq!(statement.kind, StatementKind::ReadOnly);
        assert!(!statement.shape.unwrap_single);
    }

    #[test]
    fn test_equality_filter_binds_parameter() {
        let statement = compile_query(
            Field::new("User")
                .argument("name", Value::String("John 3".into()))
                .child(Field::new("age")),
        );
        assert!(statement.cypher.contains("WHERE user_1.name = $user_1_name"));
        assert_eq!(statement.parameters["user_1_name"], json!("John 3"));
        // name is not the identifier, so no root unwrap
        assert!(!statement.shape.unwrap_single);
    }

    #[test]
    fn test_identifier_filter_unwraps_root() {
        let statement = compile_query(
            Field::new("User")
                .argument("id", Value::Int(3))
                .child(Field::new("name")),
        );
        assert!(statement.cypher.contains("WHERE user_1.id = $user_1_id"));
        assert!(statement.shape.unwrap_single);
    }

    #[test]
    fn test_ids_filter_unwinds_in_input_order() {
        let statement = compile_query(
            Field::new("User")
                .argument("ids", Value::List(vec![Value::Int(3), Value::Int(4)]))
                .child(Field::new("id"))
                .child(Field::new("name")),
        );
        let lines: Vec<&str> = statement.cypher.lines().collect();
        assert_eq!(lines[0], "UNWIND $user_1_ids AS user_1_key");
        assert_eq!(lines[1], "MATCH (user_1:User)");
        assert!(lines[2].contains("WHERE user_1.id = user_1_key"));
        assert_eq!(statement.parameters["user_1_ids"], json!([3, 4]));
        // a list filter never unwraps, even over the identifier
        assert!(!statement.shape.unwrap_single);
    }

    #[test]
    fn test_nested_relationship_call_scope() {
        let statement = compile_query(
            Field::new("Location").child(Field::new("name")).child(
                Field::new("livesIn")
                    .argument("orderBy", Value::List(vec![Value::Enum("age_desc".into())]))
                    .child(Field::new("name"))
                    .child(Field::new("age")),
            ),
        );
        let cypher = &statement.cypher;
        assert!(cypher.contains("MATCH (location_1:Location)"));
        assert!(cypher.contains("CALL {"));
        assert!(cypher.contains("WITH location_1"));
        assert!(cypher.contains("MATCH (location_1)<-[:LIVES_IN]-(user_2:User)"));
        assert!(cypher.contains("WITH user_2 ORDER BY user_2.age DESC"));
        assert!(cypher.contains("RETURN collect({name: user_2.name, age: user_2.age}) AS livesIn_3"));
        assert!(cypher.contains("RETURN location_1.name AS name, livesIn_3 AS livesIn"));
    }

    #[test]
    fn test_nested_pagination_stays_in_child_scope() {
        let statement = compile_query(
            Field::new("Location").child(Field::new("name")).child(
                Field::new("livesIn")
                    .argument("first", Value::Int(2))
                    .argument("offset", Value::Int(1))
                    .child(Field::new("name")),
            ),
        );
        let cypher = &statement.cypher;
        assert!(cypher.contains("WITH user_2 SKIP $user_2_offset LIMIT $user_2_first"));
        assert_eq!(statement.parameters["user_2_first"], json!(2));
        assert_eq!(statement.parameters["user_2_offset"], json!(1));
        // the root scope carries no pagination of its own
        assert!(!cypher.contains("WITH location_1 SKIP"));
        assert!(!cypher.contains("WITH location_1 LIMIT"));
    }

    #[test]
    fn test_single_cardinality_child_gets_limit_one() {
        let statement = compile_query(
            Field::new("User")
                .child(Field::new("name"))
                .child(Field::new("livesIn").child(Field::new("name"))),
        );
        assert!(statement
            .cypher
            .contains("MATCH (user_1)-[:LIVES_IN]->(location_2:Location)"));
        assert!(statement.cypher.contains("WITH location_2 LIMIT 1"));
    }

    #[test]
    fn test_templated_relationship_anchors_this() {
        let statement = compile_query(
            Field::new("User").child(Field::new("name")).child(
                Field::new("neighbours")
                    .argument("first", Value::Int(2))
                    .child(Field::new("name")),
            ),
        );
        let cypher = &statement.cypher;
        assert!(cypher.contains("WITH user_1 AS this"));
        assert!(cypher.contains(
            "MATCH (this)-[:LIVES_IN]->(:Location)<-[:LIVES_IN]-(other:User) RETURN other AS user_2"
        ));
        assert!(cypher.contains("WITH user_2 LIMIT $user_2_first"));
        assert!(cypher.contains("RETURN collect({name: user_2.name}) AS neighbours_3"));
        assert_eq!(statement.parameters["user_2_first"], json!(2));
    }

    #[test]
    fn test_templated_relationship_rejects_placeholders() {
        let field = Field::new("User")
            .child(Field::new("broken").child(Field::new("name")));
        assert!(matches!(
            compile_field(&field, OperationKind::Query, &berlin_schema()),
            Err(CompileError::Malformed { ref argument, .. }) if argument == "key"
        ));
    }

    #[test]
    fn test_computed_field_binds_template_arguments() {
        let statement = compile_query(
            Field::new("User")
                .child(Field::new("name"))
                .child(Field::new("score").argument("value", Value::Int(7))),
        );
        let cypher = &statement.cypher;
        assert!(cypher.contains("WITH user_1 AS this"));
        assert!(cypher.contains("RETURN $score_2_value AS score_2"));
        assert!(cypher.contains("score_2 AS score"));
        assert_eq!(statement.parameters["score_2_value"], json!(7));
    }

    #[test]
    fn test_mutation_compiles_template_with_parameters() {
        let field = Field::new("createUser")
            .argument("name", Value::String("Ada".into()));
        let statement =
            compile_field(&field, OperationKind::Mutation, &berlin_schema()).unwrap();
        assert_eq!(
            statement.cypher,
            "CREATE (u:User {name: $name}) RETURN u.name AS name"
        );
        assert_eq!(statement.parameters["name"], json!("Ada"));
        assert_eq!(statement.kind, StatementKind::ReadWrite);
        assert!(statement.shape.passthrough);
    }

    #[test]
    fn test_unknown_field_and_member() {
        let schema = berlin_schema();
        let unknown_root = Field::new("Ghost").child(Field::new("name"));
        assert!(matches!(
            compile_field(&unknown_root, OperationKind::Query, &schema),
            Err(CompileError::UnknownField(ref name)) if name == "Ghost"
        ));

        let unknown_member = Field::new("User").child(Field::new("email"));
        assert!(matches!(
            compile_field(&unknown_member, OperationKind::Query, &schema),
            Err(CompileError::UnknownMember { ref field, .. }) if field == "email"
        ));
    }

    #[test]
    fn test_selection_shape_errors() {
        let schema = berlin_schema();
        let scalar_with_children = Field::new("User").child(Field::new("name").child(Field::new("x")));
        assert!(matches!(
            compile_field(&scalar_with_children, OperationKind::Query, &schema),
            Err(CompileError::ScalarSelection(_))
        ));

        let bare_relationship = Field::new("User").child(Field::new("livesIn"));
        assert!(matches!(
            compile_field(&bare_relationship, OperationKind::Query, &schema),
            Err(CompileError::MissingSelection(_))
        ));

        let no_selection = Field::new("User");
        assert!(matches!(
            compile_field(&no_selection, OperationKind::Query, &schema),
            Err(CompileError::MissingSelection(_))
        ));
    }

    #[test]
    fn test_compile_operation_isolates_failures() {
        let operation = Operation::query(vec![
            Field::new("User").child(Field::new("name")),
            Field::new("Ghost").child(Field::new("name")),
        ]);
        let compiled = compile_operation(&operation, &ParamMap::new(), &berlin_schema());
        assert_eq!(compiled.len(), 2);
        assert!(compiled[0].result.is_ok());
        assert!(compiled[1].result.is_err());
    }

    #[test]
    fn test_compile_operation_resolves_variables_per_field() {
        let mut variables = ParamMap::new();
        variables.insert("name".to_string(), json!("John 3"));
        let operation = Operation::query(vec![Field::new("User")
            .argument("name", Value::Variable("name".into()))
            .child(Field::new("age"))]);
        let compiled = compile_operation(&operation, &variables, &berlin_schema());
        let statement = compiled[0].result.as_ref().unwrap();
        assert_eq!(statement.parameters["user_1_name"], json!("John 3"));

        let unbound = compile_operation(&operation, &ParamMap::new(), &berlin_schema());
        assert!(matches!(
            unbound[0].result,
            Err(CompileError::UnresolvedVariable(_))
        ));
    }

    #[test]
    fn test_directive_selects_mode() {
        let operation = Operation::query(vec![Field::new("User")
            .directive(Directive::new("compile"))
            .child(Field::new("name"))]);
        let compiled = compile_operation(&operation, &ParamMap::new(), &berlin_schema());
        assert_eq!(compiled[0].mode, ExecutionMode::CompileOnly);
    }

    #[test]
    fn test_fresh_variables_never_collide_across_siblings() {
        let statement = compile_query(
            Field::new("Location")
                .child(Field::new("name"))
                .child(Field::new("livesIn").aliased("a").child(Field::new("id")))
                .child(Field::new("livesIn").aliased("b").child(Field::new("age"))),
        );
        assert!(statement.cypher.contains("(user_2:User)"));
        assert!(statement.cypher.contains("(user_4:User)"));
        assert!(statement.cypher.contains("AS a_3"));
        assert!(statement.cypher.contains("AS b_5"));
    }
}
