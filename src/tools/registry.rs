//! Tool registry - registration, enumeration, and dispatch.
//!
//! One place to declare callable capabilities with a machine-checkable
//! contract and execute them on demand. Registration is create-or-replace:
//! re-registering a name swaps the definition in a single map transition, so
//! no in-process caller ever observes a state where the name resolves to
//! neither the old nor the new tool.

use std::collections::HashMap;
use std::sync::Arc;

use rusqlite::ToSql;
use rusqlite::types::ValueRef;
use tracing::{debug, info};

use crate::error::{Result, ToolbeltError};
use crate::namespace::Namespace;
use crate::retrieval::VectorSearchClient;
use crate::store::SqliteStore;

use super::definition::{
    ColumnSpec, Execution, ReturnShape, ScalarType, ScalarValue, ToolDefinition, ToolSpecification,
};
use super::invocation::{Table, ToolArgs, ToolResult, validate_args};

/// Acknowledgement returned by a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResult {
    /// `catalog.schema.tool`
    pub full_name: String,
    /// Whether an existing definition was replaced
    pub replaced: bool,
}

struct RegisteredTool {
    spec: ToolSpecification,
    /// Executable SQL with table references already resolved, query tools only
    rendered_sql: Option<String>,
}

/// Registry of callable tools scoped to a namespace
pub struct ToolRegistry {
    namespace: Namespace,
    store: SqliteStore,
    search: Option<Arc<dyn VectorSearchClient>>,
    order: Vec<String>,
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry over the given namespace and store
    pub fn new(namespace: Namespace, store: SqliteStore) -> Self {
        Self {
            namespace,
            store,
            search: None,
            order: Vec::new(),
            tools: HashMap::new(),
        }
    }

    /// Attach the vector-search collaborator used by search tools
    pub fn with_search_client(mut self, client: Arc<dyn VectorSearchClient>) -> Self {
        self.search = Some(client);
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Register a tool, replacing any existing definition with the same name.
    ///
    /// Query bodies are rendered against the namespace and prepared against
    /// the store here, so a body that references a missing table or fails to
    /// parse never becomes invocable.
    pub fn register(&mut self, spec: ToolSpecification) -> Result<RegistrationResult> {
        spec.validate()?;

        let rendered_sql = match &spec.execution {
            Execution::Query(template) => {
                for param in &spec.parameters {
                    if !template.binds(&param.name) {
                        return Err(ToolbeltError::InvalidSpecification(format!(
                            "query for tool '{}' never binds parameter ':{}'",
                            spec.name, param.name
                        )));
                    }
                }

                let sql = template.render(&self.namespace)?;
                self.store.connection().prepare(&sql).map_err(|e| {
                    ToolbeltError::InvalidSpecification(format!(
                        "query for tool '{}' does not compile: {}",
                        spec.name, e
                    ))
                })?;
                Some(sql)
            }
            Execution::Native(_) | Execution::Search { .. } => None,
        };

        let name = spec.name.clone();
        let replaced = self
            .tools
            .insert(name.clone(), RegisteredTool { spec, rendered_sql })
            .is_some();
        if !replaced {
            self.order.push(name.clone());
        }

        let full_name = self.namespace.qualify(&name);
        info!(tool = %full_name, replaced, "registered tool");
        Ok(RegistrationResult { full_name, replaced })
    }

    /// Remove a tool definition
    pub fn deregister(&mut self, name: &str) -> Result<()> {
        if self.tools.remove(name).is_none() {
            return Err(ToolbeltError::UnknownTool(name.to_string()));
        }
        self.order.retain(|n| n != name);
        info!(tool = %self.namespace.qualify(name), "deregistered tool");
        Ok(())
    }

    /// Invoke a registered tool with typed arguments.
    ///
    /// Arguments are checked against the declared parameters before anything
    /// touches the data source.
    pub fn invoke(&self, name: &str, args: &ToolArgs) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolbeltError::UnknownTool(name.to_string()))?;

        let validated = validate_args(&tool.spec, args)?;
        debug!(tool = %self.namespace.qualify(name), "invoking tool");

        match &tool.spec.execution {
            Execution::Query(_) => {
                let sql = tool
                    .rendered_sql
                    .as_deref()
                    .ok_or_else(|| ToolbeltError::Execution(format!("tool '{}' has no rendered query", name)))?;
                let ReturnShape::Table(columns) = &tool.spec.return_shape else {
                    return Err(ToolbeltError::Execution(format!(
                        "query tool '{}' lost its tabular return shape",
                        name
                    )));
                };
                self.execute_query(sql, columns, &validated).map(ToolResult::Table)
            }
            Execution::Native(f) => {
                let value = f(&validated)?;
                if let ReturnShape::Scalar(expected) = &tool.spec.return_shape
                    && value.scalar_type() != Some(*expected)
                {
                    return Err(ToolbeltError::Execution(format!(
                        "native tool '{}' returned {:?}, declared {:?}",
                        name,
                        value.scalar_type(),
                        expected
                    )));
                }
                Ok(ToolResult::Scalar(value))
            }
            Execution::Search { num_results } => {
                let client = self.search.as_ref().ok_or_else(|| {
                    ToolbeltError::Execution(format!(
                        "tool '{}' requires a vector search client, none configured",
                        name
                    ))
                })?;
                let query = validated
                    .get("query")
                    .map(|v| v.to_string())
                    .ok_or_else(|| {
                        ToolbeltError::ArgumentMismatch(format!(
                            "search tool '{}' requires a 'query' parameter",
                            name
                        ))
                    })?;
                let hits = client.search(&query, *num_results)?;

                let ReturnShape::Table(columns) = &tool.spec.return_shape else {
                    return Err(ToolbeltError::Execution(format!(
                        "search tool '{}' lost its tabular return shape",
                        name
                    )));
                };
                let mut table = Table::new(columns.clone());
                for hit in hits {
                    let mut row = Vec::with_capacity(columns.len());
                    for col in columns {
                        match col.name.as_str() {
                            "description" => row.push(ScalarValue::Text(hit.description.clone())),
                            "item_id" => row.push(ScalarValue::Text(hit.item_id.clone())),
                            other => {
                                return Err(ToolbeltError::Execution(format!(
                                    "search tool '{}' declares unmapped column '{}'",
                                    name, other
                                )));
                            }
                        }
                    }
                    table.push_row(row)?;
                }
                Ok(ToolResult::Table(table))
            }
        }
    }

    /// Invoke with a JSON argument payload, returning a JSON result.
    /// Convenience for the agent host boundary.
    pub fn invoke_json(&self, name: &str, args: &serde_json::Value) -> Result<serde_json::Value> {
        let args = ToolArgs::from_json(args)?;
        Ok(self.invoke(name, &args)?.to_json())
    }

    /// All registered specifications, in registration order.
    /// A replaced tool keeps its original position.
    pub fn list(&self) -> Vec<&ToolSpecification> {
        self.order.iter().filter_map(|n| self.tools.get(n)).map(|t| &t.spec).collect()
    }

    /// Prompt-visible toolset for the agent host
    pub fn toolset(&self) -> Vec<ToolDefinition> {
        self.list().into_iter().map(ToolDefinition::from_spec).collect()
    }

    /// Get a registered specification by name
    pub fn get(&self, name: &str) -> Option<&ToolSpecification> {
        self.tools.get(name).map(|t| &t.spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn execute_query(&self, sql: &str, columns: &[ColumnSpec], args: &ToolArgs) -> Result<Table> {
        let mut stmt = self
            .store
            .connection()
            .prepare(sql)
            .map_err(|e| ToolbeltError::Execution(e.to_string()))?;

        // Resolve declared columns against the result set before running
        let mut indices = Vec::with_capacity(columns.len());
        for col in columns {
            let idx = stmt.column_index(&col.name).map_err(|_| {
                ToolbeltError::Execution(format!("query result has no column '{}'", col.name))
            })?;
            indices.push(idx);
        }

        let keys: Vec<String> = args.names().map(|n| format!(":{}", n)).collect();
        let values: Vec<&ScalarValue> = args.names().filter_map(|n| args.get(n)).collect();
        let bind: Vec<(&str, &dyn ToSql)> = keys
            .iter()
            .map(|k| k.as_str())
            .zip(values.iter().map(|v| *v as &dyn ToSql))
            .collect();

        let mut rows = stmt
            .query(&bind[..])
            .map_err(|e| ToolbeltError::Execution(e.to_string()))?;

        let mut table = Table::new(columns.to_vec());
        while let Some(row) = rows.next().map_err(|e| ToolbeltError::Execution(e.to_string()))? {
            let mut cells = Vec::with_capacity(columns.len());
            for (col, idx) in columns.iter().zip(&indices) {
                let value = row
                    .get_ref(*idx)
                    .map_err(|e| ToolbeltError::Execution(e.to_string()))?;
                cells.push(decode_column(value, col)?);
            }
            table.push_row(cells)?;
        }

        Ok(table)
    }
}

/// Convert a raw SQLite value into the column's declared scalar type
fn decode_column(value: ValueRef<'_>, col: &ColumnSpec) -> Result<ScalarValue> {
    let mismatch = |got: &str| {
        ToolbeltError::Execution(format!(
            "column '{}' declared {:?}, store returned {}",
            col.name, col.column_type, got
        ))
    };

    match value {
        ValueRef::Null => Ok(ScalarValue::Null),
        ValueRef::Integer(i) => match col.column_type {
            ScalarType::Integer => Ok(ScalarValue::Integer(i)),
            ScalarType::Float => Ok(ScalarValue::Float(i as f64)),
            ScalarType::Boolean => Ok(ScalarValue::Boolean(i != 0)),
            _ => Err(mismatch("an integer")),
        },
        ValueRef::Real(v) => match col.column_type {
            ScalarType::Float => Ok(ScalarValue::Float(v)),
            _ => Err(mismatch("a real")),
        },
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes).map_err(|_| mismatch("non-utf8 text"))?;
            match col.column_type {
                ScalarType::String => Ok(ScalarValue::Text(s.to_string())),
                ScalarType::Date => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(ScalarValue::Date)
                    .map_err(|_| mismatch("undateable text")),
                _ => Err(mismatch("text")),
            }
        }
        ValueRef::Blob(_) => Err(mismatch("a blob")),
    }
}
