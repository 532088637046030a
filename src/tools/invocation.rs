//! Invocation-side types: argument maps and tool results.
//!
//! Arguments are validated against the declared parameter list before any
//! execution happens, so a bad call never reaches the data source.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ToolbeltError};
use crate::tools::definition::{ColumnSpec, ScalarType, ScalarValue, ToolSpecification};

/// Arguments for a tool invocation, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: BTreeMap<String, ScalarValue>,
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ScalarValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build args from an agent host's JSON payload.
    ///
    /// Only an object of scalar values is accepted; nested arrays or objects
    /// have no place in the contract and are rejected up front.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ToolbeltError::ArgumentMismatch("arguments must be a JSON object".to_string())
        })?;

        let mut args = Self::new();
        for (name, v) in obj {
            let scalar = match v {
                Value::Null => ScalarValue::Null,
                Value::Bool(b) => ScalarValue::Boolean(*b),
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        ScalarValue::Integer(i)
                    } else if let Some(f) = n.as_f64() {
                        ScalarValue::Float(f)
                    } else {
                        return Err(ToolbeltError::ArgumentMismatch(format!(
                            "argument '{}' is not a representable number",
                            name
                        )));
                    }
                }
                Value::String(s) => ScalarValue::Text(s.clone()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ToolbeltError::ArgumentMismatch(format!(
                        "argument '{}' must be a scalar",
                        name
                    )));
                }
            };
            args.values.insert(name.clone(), scalar);
        }

        Ok(args)
    }
}

/// Check supplied arguments against a tool's declared parameters and return
/// the coerced, fully typed argument map.
///
/// Every declared parameter is required. Unknown names are rejected. The only
/// coercions are ISO `YYYY-MM-DD` text into a declared DATE parameter and an
/// integer widening into a declared FLOAT parameter.
pub fn validate_args(spec: &ToolSpecification, args: &ToolArgs) -> Result<ToolArgs> {
    for name in args.names() {
        if spec.param(name).is_none() {
            return Err(ToolbeltError::ArgumentMismatch(format!(
                "tool '{}' has no parameter '{}'",
                spec.name, name
            )));
        }
    }

    let mut validated = ToolArgs::new();
    for param in &spec.parameters {
        let value = args.get(&param.name).ok_or_else(|| {
            ToolbeltError::ArgumentMismatch(format!(
                "tool '{}' missing required parameter '{}'",
                spec.name, param.name
            ))
        })?;

        let coerced = coerce_value(value, param.param_type).ok_or_else(|| {
            ToolbeltError::ArgumentMismatch(format!(
                "parameter '{}' of tool '{}' expects {:?}, got {:?}",
                param.name,
                spec.name,
                param.param_type,
                value.scalar_type()
            ))
        })?;
        validated.insert(param.name.clone(), coerced);
    }

    Ok(validated)
}

fn coerce_value(value: &ScalarValue, expected: ScalarType) -> Option<ScalarValue> {
    match (value, expected) {
        (ScalarValue::Text(s), ScalarType::Date) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(ScalarValue::Date)
        }
        (ScalarValue::Integer(i), ScalarType::Float) => Some(ScalarValue::Float(*i as f64)),
        _ if value.scalar_type() == Some(expected) => Some(value.clone()),
        _ => None,
    }
}

/// An ordered sequence of rows conforming to a fixed column set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<ScalarValue>>,
}

impl Table {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row; its arity must match the declared column set
    pub fn push_row(&mut self, row: Vec<ScalarValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ToolbeltError::Execution(format!(
                "row has {} values, table declares {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<ScalarValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&ScalarValue> {
        let idx = self.columns.iter().position(|c| c.name == column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Render as a JSON array of row objects, columns in declared order
    pub fn to_json(&self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (col, value) in self.columns.iter().zip(row) {
                    obj.insert(
                        col.name.clone(),
                        serde_json::to_value(value).unwrap_or(Value::Null),
                    );
                }
                Value::Object(obj)
            })
            .collect();
        Value::Array(rows)
    }
}

/// Result of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ToolResult {
    Table(Table),
    Scalar(ScalarValue),
}

impl ToolResult {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            Self::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Table(_) => None,
        }
    }

    /// JSON rendering handed back to the agent host
    pub fn to_json(&self) -> Value {
        match self {
            Self::Table(t) => t.to_json(),
            Self::Scalar(v) => serde_json::to_value(v).unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::definition::{Execution, ParamSpec, ReturnShape};
    use serde_json::json;
    use std::sync::Arc;

    fn spec_with_params(params: Vec<ParamSpec>) -> ToolSpecification {
        ToolSpecification {
            name: "t".to_string(),
            description: "test tool".to_string(),
            parameters: params,
            return_shape: ReturnShape::Scalar(ScalarType::String),
            execution: Execution::Native(Arc::new(|_| Ok(ScalarValue::Text("x".into())))),
        }
    }

    #[test]
    fn test_args_builder() {
        let args = ToolArgs::new().with("customer_name", "david sanchez");
        assert_eq!(
            args.get("customer_name"),
            Some(&ScalarValue::Text("david sanchez".to_string()))
        );
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_args_from_json() {
        let args = ToolArgs::from_json(&json!({
            "name": "David",
            "count": 3,
            "ratio": 0.5,
            "flag": true
        }))
        .unwrap();
        assert_eq!(args.get("name"), Some(&ScalarValue::Text("David".into())));
        assert_eq!(args.get("count"), Some(&ScalarValue::Integer(3)));
        assert_eq!(args.get("ratio"), Some(&ScalarValue::Float(0.5)));
        assert_eq!(args.get("flag"), Some(&ScalarValue::Boolean(true)));
    }

    #[test]
    fn test_args_from_json_rejects_nested() {
        assert!(ToolArgs::from_json(&json!({"a": [1, 2]})).is_err());
        assert!(ToolArgs::from_json(&json!({"a": {"b": 1}})).is_err());
        assert!(ToolArgs::from_json(&json!("not an object")).is_err());
    }

    #[test]
    fn test_validate_args_missing_required() {
        let spec = spec_with_params(vec![ParamSpec::new(
            "customer_name",
            ScalarType::String,
            "name",
        )]);
        let err = validate_args(&spec, &ToolArgs::new()).unwrap_err();
        assert!(matches!(err, ToolbeltError::ArgumentMismatch(_)));
        assert!(err.to_string().contains("customer_name"));
    }

    #[test]
    fn test_validate_args_unknown_name() {
        let spec = spec_with_params(vec![]);
        let args = ToolArgs::new().with("extra", "x");
        assert!(matches!(
            validate_args(&spec, &args),
            Err(ToolbeltError::ArgumentMismatch(_))
        ));
    }

    #[test]
    fn test_validate_args_type_mismatch() {
        let spec = spec_with_params(vec![ParamSpec::new("count", ScalarType::Integer, "n")]);
        let args = ToolArgs::new().with("count", "three");
        assert!(matches!(
            validate_args(&spec, &args),
            Err(ToolbeltError::ArgumentMismatch(_))
        ));
    }

    #[test]
    fn test_validate_args_coerces_date_text() {
        let spec = spec_with_params(vec![ParamSpec::new("since", ScalarType::Date, "cutoff")]);
        let args = ToolArgs::new().with("since", "2024-03-01");
        let validated = validate_args(&spec, &args).unwrap();
        assert_eq!(
            validated.get("since"),
            Some(&ScalarValue::Date(
                chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            ))
        );
    }

    #[test]
    fn test_validate_args_rejects_bad_date_text() {
        let spec = spec_with_params(vec![ParamSpec::new("since", ScalarType::Date, "cutoff")]);
        let args = ToolArgs::new().with("since", "first of march");
        assert!(validate_args(&spec, &args).is_err());
    }

    #[test]
    fn test_validate_args_widens_integer_to_float() {
        let spec = spec_with_params(vec![ParamSpec::new("ratio", ScalarType::Float, "r")]);
        let args = ToolArgs::new().with("ratio", 2i64);
        let validated = validate_args(&spec, &args).unwrap();
        assert_eq!(validated.get("ratio"), Some(&ScalarValue::Float(2.0)));
    }

    #[test]
    fn test_table_push_row_arity() {
        let mut table = Table::new(vec![
            ColumnSpec::new("item_id", ScalarType::String),
            ColumnSpec::new("action", ScalarType::String),
        ]);
        assert!(table.push_row(vec!["I1".into(), "view".into()]).is_ok());
        assert!(table.push_row(vec!["I1".into()]).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_table_value_lookup() {
        let mut table = Table::new(vec![ColumnSpec::new("item_id", ScalarType::String)]);
        table.push_row(vec!["I2".into()]).unwrap();
        assert_eq!(table.value(0, "item_id"), Some(&ScalarValue::Text("I2".into())));
        assert_eq!(table.value(0, "missing"), None);
        assert_eq!(table.value(1, "item_id"), None);
    }

    #[test]
    fn test_table_to_json() {
        let mut table = Table::new(vec![
            ColumnSpec::new("item_id", ScalarType::String),
            ColumnSpec::new("purchase_date", ScalarType::Date),
        ]);
        table
            .push_row(vec![
                "I2".into(),
                chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().into(),
            ])
            .unwrap();

        let json = table.to_json();
        assert_eq!(json[0]["item_id"], "I2");
        assert_eq!(json[0]["purchase_date"], "2024-03-01");
    }

    #[test]
    fn test_tool_result_accessors() {
        let scalar = ToolResult::Scalar(ScalarValue::Text("2024-03-01".into()));
        assert!(scalar.as_scalar().is_some());
        assert!(scalar.as_table().is_none());
        assert_eq!(scalar.to_json(), json!("2024-03-01"));
    }
}
