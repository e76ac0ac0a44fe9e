/// Kind of a GraphQL operation
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A complete GraphQL operation: a named or anonymous selection tree
/// of top-level fields
#[derive(Debug, PartialEq, Clone)]
pub struct Operation {
    pub name: Option<String>,
    pub kind: OperationKind,
    pub fields: Vec<Field>,
}

impl Operation {
    pub fn query(fields: Vec<Field>) -> Self {
        Self {
            name: None,
            kind: OperationKind::Query,
            fields,
        }
    }

    pub fn mutation(fields: Vec<Field>) -> Self {
        Self {
            name: None,
            kind: OperationKind::Mutation,
            fields,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One field selection: an optional response alias, the field name,
/// arguments, directives, and child selections
///
/// A field with no children selects a scalar; a field with children
/// selects a related entity (or a top-level entity kind).
#[derive(Debug, PartialEq, Clone)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    pub children: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            directives: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.push(Argument {
            name: name.into(),
            value,
        });
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn child(mut self, child: Field) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: Vec<Field>) -> Self {
        self.children.extend(children);
        self
    }

    /// The key this field contributes to the response tree: the alias
    /// when present, the field name otherwise
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn get_argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }
}

/// A named argument on a field or directive
#[derive(Debug, PartialEq, Clone)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

/// A directive attached to a field, e.g. `@explain` or `@profile`
#[derive(Debug, PartialEq, Clone)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }
}

/// An argument value as written in the selection tree
///
/// `Enum` holds bare tokens such as ordering specifiers (`name_desc`);
/// `Variable` holds an unresolved `$name` reference and must be
/// substituted before compilation.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<Value>),
    Variable(String),
}

impl Value {
    /// Convert to a JSON parameter value. Variables have no JSON form;
    /// callers resolve them first.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Boolean(b) => Some(serde_json::Value::Bool(*b)),
            Value::Int(i) => Some(serde_json::Value::Number((*i).into())),
            Value::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
            Value::String(s) | Value::Enum(s) => Some(serde_json::Value::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(|v| v.to_json())
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Variable(_) => None,
        }
    }
}
