//! svc-command-schema: Declarative argument schemas for svc-command
//!
//! This crate defines the read-only descriptions an operation is validated
//! against: owned [`ArgumentSchema`]s (usually loaded from a JSON service
//! description) and `const` [`ParamDescriptor`] tables declared per
//! operation type. Both implement [`ArgRule`], which is all the validator
//! needs to see.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod service;

pub use service::{SchemaError, ServiceDescription};

/// Value type an argument must have when validated strictly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    /// Any JSON value is accepted
    #[default]
    Any,
    String,
    /// Whole number (signed or unsigned)
    Integer,
    /// Any JSON number
    Number,
    Boolean,
    Array,
    Object,
}

impl ArgType {
    /// Check whether a value satisfies this type
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::String => value.is_string(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::Number => value.is_number(),
            ArgType::Boolean => value.is_boolean(),
            ArgType::Array => value.is_array(),
            ArgType::Object => value.is_object(),
        }
    }

    /// Lowercase name as used in service descriptions
    pub fn as_str(self) -> &'static str {
        match self {
            ArgType::Any => "any",
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::Number => "number",
            ArgType::Boolean => "boolean",
            ArgType::Array => "array",
            ArgType::Object => "object",
        }
    }
}

impl std::fmt::Display for ArgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a described argument ends up in the built request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Substituted into the URI template
    Uri,
    /// Appended to the query string
    Query,
    /// Sent as a request header
    Header,
    /// Collected into a JSON object body
    Body,
}

/// Read-only view of a single argument rule.
///
/// The validator walks rules through this trait so schema-driven and
/// declared-metadata validation share the same required/default semantics.
pub trait ArgRule {
    /// Parameter key this rule applies to
    fn name(&self) -> &str;

    /// Whether strict validation fails when the key is missing
    fn is_required(&self) -> bool;

    /// Value injected when the key is missing
    fn default_value(&self) -> Option<Value>;

    /// Expected value type
    fn kind(&self) -> ArgType;

    /// Allowed values; empty means unrestricted
    fn possible_values(&self) -> &[Value] {
        &[]
    }
}

// ============================================================================
// Owned schemas
// ============================================================================

/// Declarative description of one operation and its arguments.
///
/// Schemas are immutable once built and are shared between commands through
/// `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    /// Operation name (e.g., "GetUser")
    pub name: String,

    /// Short description for documentation
    #[serde(default)]
    pub summary: String,

    /// HTTP method used by schema-described operations
    #[serde(default)]
    pub method: Option<String>,

    /// URI template with `{name}` placeholders
    #[serde(default)]
    pub uri: Option<String>,

    /// Argument descriptors, in declaration order
    #[serde(default)]
    pub args: Vec<ArgDescriptor>,
}

/// Argument descriptor inside an [`ArgumentSchema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgDescriptor {
    /// Parameter key
    pub name: String,

    /// Whether this argument is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(default)]
    pub default: Option<Value>,

    /// Expected value type
    #[serde(rename = "type", default)]
    pub kind: ArgType,

    /// List of allowed values
    #[serde(default)]
    pub possible_values: Option<Vec<Value>>,

    /// Where the value is placed in a described request
    #[serde(default)]
    pub location: Option<Location>,

    /// Help text for this argument
    #[serde(default)]
    pub help: String,
}

impl ArgumentSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            method: None,
            uri: None,
            args: Vec::new(),
        }
    }

    /// Set the summary
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the HTTP method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the URI template
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add an argument
    pub fn arg(mut self, arg: ArgDescriptor) -> Self {
        self.args.push(arg);
        self
    }

    /// Look up an argument by name
    pub fn find_arg(&self, name: &str) -> Option<&ArgDescriptor> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

impl ArgDescriptor {
    /// Create an optional argument accepting any value
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default: None,
            kind: ArgType::Any,
            possible_values: None,
            location: None,
            help: String::new(),
        }
    }

    /// Set as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set default value
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the expected type
    pub fn kind(mut self, kind: ArgType) -> Self {
        self.kind = kind;
        self
    }

    /// Restrict to a set of values
    pub fn possible_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.possible_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the request location
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

impl ArgRule for ArgDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    fn kind(&self) -> ArgType {
        self.kind
    }

    fn possible_values(&self) -> &[Value] {
        self.possible_values.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Static descriptor tables
// ============================================================================

/// Default value usable in a `const` descriptor table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticValue {
    Str(&'static str),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl StaticValue {
    /// Convert into a JSON value
    pub fn to_value(self) -> Value {
        match self {
            StaticValue::Str(s) => Value::from(s),
            StaticValue::Int(i) => Value::from(i),
            StaticValue::Float(f) => Value::from(f),
            StaticValue::Bool(b) => Value::from(b),
        }
    }
}

/// Declared parameter of an operation type.
///
/// Tables of these are attached to operation types at definition time,
/// usually through `#[derive(DeclaredParams)]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<StaticValue>,
    pub kind: ArgType,
}

impl ParamDescriptor {
    /// Create a required parameter
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
            kind: ArgType::Any,
        }
    }

    /// Create an optional parameter
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            default: None,
            kind: ArgType::Any,
        }
    }

    /// Set default value
    pub const fn with_default(mut self, value: StaticValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the expected type
    pub const fn of_kind(mut self, kind: ArgType) -> Self {
        self.kind = kind;
        self
    }
}

impl ArgRule for ParamDescriptor {
    fn name(&self) -> &str {
        self.name
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn default_value(&self) -> Option<Value> {
        self.default.map(StaticValue::to_value)
    }

    fn kind(&self) -> ArgType {
        self.kind
    }
}

/// Operation types that carry a declared parameter table
pub trait DeclaredParams {
    /// Declared parameters, in declaration order
    const PARAMS: &'static [ParamDescriptor];
}
