//! Tool manifest loading from TOML.
//!
//! Query-variant tools are plain data (name, description, params, columns,
//! SQL body), so they can be declared in a TOML file and registered in bulk
//! instead of being constructed in code.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ToolbeltError};

use super::definition::{ColumnSpec, Execution, ParamSpec, ReturnShape, ScalarType, ToolSpecification};
use super::query::QueryTemplate;
use super::registry::{RegistrationResult, ToolRegistry};

/// TOML representation of a tool parameter
#[derive(Debug, Deserialize)]
struct TomlParam {
    name: String,
    #[serde(rename = "type")]
    param_type: String,
    description: String,
}

/// TOML representation of a result column
#[derive(Debug, Deserialize)]
struct TomlColumn {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
}

/// TOML representation of a query tool
#[derive(Debug, Deserialize)]
struct TomlTool {
    name: String,
    description: String,
    sql: String,
    #[serde(default, rename = "param")]
    params: Vec<TomlParam>,
    #[serde(default, rename = "column")]
    columns: Vec<TomlColumn>,
}

/// TOML file structure
#[derive(Debug, Deserialize)]
struct TomlManifest {
    #[serde(default, rename = "tool")]
    tools: Vec<TomlTool>,
}

/// A parsed set of query-tool specifications
#[derive(Debug, Clone)]
pub struct ToolManifest {
    specs: Vec<ToolSpecification>,
}

impl ToolManifest {
    /// Load a manifest from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse a manifest from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let manifest: TomlManifest = toml::from_str(content)
            .map_err(|e| ToolbeltError::InvalidSpecification(format!("failed to parse manifest: {}", e)))?;

        let mut specs = Vec::with_capacity(manifest.tools.len());
        for tool in manifest.tools {
            specs.push(convert_tool(tool)?);
        }

        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ToolSpecification] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Register every tool in manifest order
    pub fn register_all(&self, registry: &mut ToolRegistry) -> Result<Vec<RegistrationResult>> {
        self.specs.iter().map(|spec| registry.register(spec.clone())).collect()
    }
}

fn parse_type(raw: &str, context: &str) -> Result<ScalarType> {
    ScalarType::from_str(raw).ok_or_else(|| {
        ToolbeltError::InvalidSpecification(format!("unknown type '{}' for {}", raw, context))
    })
}

fn convert_tool(tool: TomlTool) -> Result<ToolSpecification> {
    let mut parameters = Vec::with_capacity(tool.params.len());
    for param in tool.params {
        let param_type = parse_type(&param.param_type, &format!("parameter '{}'", param.name))?;
        parameters.push(ParamSpec::new(param.name, param_type, param.description));
    }

    let mut columns = Vec::with_capacity(tool.columns.len());
    for column in tool.columns {
        let column_type = parse_type(&column.column_type, &format!("column '{}'", column.name))?;
        columns.push(ColumnSpec::new(column.name, column_type));
    }

    let spec = ToolSpecification {
        name: tool.name,
        description: tool.description,
        parameters,
        return_shape: ReturnShape::Table(columns),
        execution: Execution::Query(QueryTemplate::new(tool.sql)),
    };
    spec.validate()?;
    Ok(spec)
}
