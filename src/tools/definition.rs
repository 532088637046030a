//! Tool specifications - the typed contract a registered tool exposes.
//!
//! A `ToolSpecification` carries everything the model-facing selector sees
//! (name, description, parameter schema, return shape) plus the execution
//! procedure the registry dispatches to. The description and schema are the
//! only contract visible to the external caller, so validation insists on
//! both being fully specified.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ToolbeltError};
use crate::namespace::validate_identifier;
use crate::tools::invocation::ToolArgs;
use crate::tools::query::QueryTemplate;

/// Scalar type of a parameter or column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
}

impl ScalarType {
    /// Parse from string representation (as used in manifests)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" | "str" | "text" => Some(Self::String),
            "integer" | "int" => Some(Self::Integer),
            "float" | "number" | "double" => Some(Self::Float),
            "boolean" | "bool" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    /// JSON Schema type name for the prompt-visible schema
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String | Self::Date => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// A typed scalar value, as bound to a query parameter or read from a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl ScalarValue {
    /// The declared type this value satisfies, None for Null
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(ScalarType::Boolean),
            Self::Integer(_) => Some(ScalarType::Integer),
            Self::Float(_) => Some(ScalarType::Float),
            Self::Date(_) => Some(ScalarType::Date),
            Self::Text(_) => Some(ScalarType::String),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl ToSql for ScalarValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Null => Ok(ToSqlOutput::from(rusqlite::types::Null)),
            Self::Boolean(b) => Ok(ToSqlOutput::from(*b)),
            Self::Integer(i) => Ok(ToSqlOutput::from(*i)),
            Self::Float(v) => Ok(ToSqlOutput::from(*v)),
            Self::Date(d) => Ok(ToSqlOutput::from(d.format("%Y-%m-%d").to_string())),
            Self::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// A declared tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ScalarType,
    /// Shown to the model-facing selector; must be non-empty
    pub description: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, param_type: ScalarType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
        }
    }
}

/// A declared result column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ScalarType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Shape of a tool's return value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnShape {
    /// A single typed value
    Scalar(ScalarType),
    /// An ordered, fixed column set; every result row conforms to it
    Table(Vec<ColumnSpec>),
}

/// Native execution procedure: a function with no declared external dependency
/// returning a single typed scalar
pub type NativeFn = Arc<dyn Fn(&ToolArgs) -> Result<ScalarValue> + Send + Sync>;

/// How a tool executes when invoked
#[derive(Clone)]
pub enum Execution {
    /// Parameterized query against the namespaced relational store
    Query(QueryTemplate),
    /// In-process function, scalar return only
    Native(NativeFn),
    /// Forward the query string to the vector-search collaborator and return
    /// its hit rows unmodified
    Search { num_results: usize },
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(q) => f.debug_tuple("Query").field(q).finish(),
            Self::Native(_) => f.write_str("Native(..)"),
            Self::Search { num_results } => {
                f.debug_struct("Search").field("num_results", num_results).finish()
            }
        }
    }
}

/// Columns a Search tool is allowed to declare; they map 1:1 onto the fields
/// of a retrieval hit.
const SEARCH_COLUMNS: &[&str] = &["description", "item_id"];

/// Complete specification of a registered tool
#[derive(Debug, Clone)]
pub struct ToolSpecification {
    /// Unique within a registry namespace
    pub name: String,
    /// Tells the model-facing selector when to invoke this tool
    pub description: String,
    /// Ordered parameter list; every parameter is required at invocation
    pub parameters: Vec<ParamSpec>,
    pub return_shape: ReturnShape,
    pub execution: Execution,
}

impl ToolSpecification {
    /// Check the name/schema constraints the registry enforces at registration.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.name)?;

        if self.description.trim().is_empty() {
            return Err(ToolbeltError::InvalidSpecification(format!(
                "tool '{}' has an empty description",
                self.name
            )));
        }

        for (i, param) in self.parameters.iter().enumerate() {
            validate_identifier(&param.name)?;
            if param.description.trim().is_empty() {
                return Err(ToolbeltError::InvalidSpecification(format!(
                    "parameter '{}' of tool '{}' has an empty description",
                    param.name, self.name
                )));
            }
            if self.parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(ToolbeltError::InvalidSpecification(format!(
                    "duplicate parameter '{}' in tool '{}'",
                    param.name, self.name
                )));
            }
        }

        if let ReturnShape::Table(columns) = &self.return_shape {
            if columns.is_empty() {
                return Err(ToolbeltError::InvalidSpecification(format!(
                    "tabular tool '{}' declares no columns",
                    self.name
                )));
            }
            for (i, col) in columns.iter().enumerate() {
                validate_identifier(&col.name)?;
                if columns[..i].iter().any(|c| c.name == col.name) {
                    return Err(ToolbeltError::InvalidSpecification(format!(
                        "duplicate column '{}' in tool '{}'",
                        col.name, self.name
                    )));
                }
            }
        }

        // Variant/shape consistency
        match (&self.execution, &self.return_shape) {
            (Execution::Native(_), ReturnShape::Scalar(_)) => {}
            (Execution::Native(_), ReturnShape::Table(_)) => {
                return Err(ToolbeltError::InvalidSpecification(format!(
                    "native tool '{}' must declare a scalar return",
                    self.name
                )));
            }
            (Execution::Query(_), ReturnShape::Table(_)) => {}
            (Execution::Query(_), ReturnShape::Scalar(_)) => {
                return Err(ToolbeltError::InvalidSpecification(format!(
                    "query tool '{}' must declare a tabular return",
                    self.name
                )));
            }
            (Execution::Search { num_results }, ReturnShape::Table(columns)) => {
                if !self
                    .parameters
                    .iter()
                    .any(|p| p.name == "query" && p.param_type == ScalarType::String)
                {
                    return Err(ToolbeltError::InvalidSpecification(format!(
                        "search tool '{}' must declare a string parameter named 'query'",
                        self.name
                    )));
                }
                if *num_results == 0 {
                    return Err(ToolbeltError::InvalidSpecification(format!(
                        "search tool '{}' must request at least one result",
                        self.name
                    )));
                }
                for col in columns {
                    if !SEARCH_COLUMNS.contains(&col.name.as_str()) {
                        return Err(ToolbeltError::InvalidSpecification(format!(
                            "search tool '{}' declares column '{}' not present in retrieval hits",
                            self.name, col.name
                        )));
                    }
                }
            }
            (Execution::Search { .. }, ReturnShape::Scalar(_)) => {
                return Err(ToolbeltError::InvalidSpecification(format!(
                    "search tool '{}' must declare a tabular return",
                    self.name
                )));
            }
        }

        Ok(())
    }

    /// Look up a declared parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Prompt-visible tool definition for the agent host
///
/// This is the shape the model-selection layer consumes: name, description,
/// and a JSON Schema object describing the arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Derive the prompt-visible definition from a registered specification
    pub fn from_spec(spec: &ToolSpecification) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &spec.parameters {
            let mut prop = serde_json::Map::new();
            prop.insert("type".to_string(), Value::String(param.param_type.json_type().to_string()));
            if param.param_type == ScalarType::Date {
                prop.insert("format".to_string(), Value::String("date".to_string()));
            }
            prop.insert("description".to_string(), Value::String(param.description.clone()));
            properties.insert(param.name.clone(), Value::Object(prop));
            required.push(Value::String(param.name.clone()));
        }

        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required
            }),
        }
    }
}
