//! Namespace scoping for tool names and table references.
//!
//! The source system scoped tools to a catalog/schema pair selected by ambient
//! notebook variables. Here the namespace is an explicit value threaded through
//! registration and invocation, and every part of it must pass identifier
//! validation before it is ever spliced into SQL.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolbeltError};

/// A catalog/schema pair within which tool names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    catalog: String,
    schema: String,
}

impl Namespace {
    /// Create a namespace from validated catalog and schema identifiers.
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Result<Self> {
        let catalog = catalog.into();
        let schema = schema.into();
        validate_identifier(&catalog)?;
        validate_identifier(&schema)?;
        Ok(Self { catalog, schema })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Fully qualified tool name, `catalog.schema.tool`.
    pub fn qualify(&self, tool_name: &str) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, tool_name)
    }

    /// Physical table name for this namespace in the backing store.
    ///
    /// SQLite has no catalog/schema levels, so namespaced tables are stored
    /// flat as `catalog_schema_table`. The table name must itself be a valid
    /// identifier; callers get an error, never a partially spliced name.
    pub fn table(&self, table_name: &str) -> Result<String> {
        validate_identifier(table_name)?;
        Ok(format!("{}_{}_{}", self.catalog, self.schema, table_name))
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}

/// Validate a SQL identifier: ASCII letter or underscore, then letters,
/// digits, or underscores. Everything spliced into query text goes through
/// this check.
pub fn validate_identifier(s: &str) -> Result<()> {
    let mut chars = s.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ToolbeltError::InvalidSpecification(format!(
            "invalid identifier: '{}'",
            s
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_new_valid() {
        let ns = Namespace::new("marion_test", "email").unwrap();
        assert_eq!(ns.catalog(), "marion_test");
        assert_eq!(ns.schema(), "email");
        assert_eq!(ns.to_string(), "marion_test.email");
    }

    #[test]
    fn test_namespace_rejects_invalid_catalog() {
        assert!(Namespace::new("bad-catalog", "email").is_err());
        assert!(Namespace::new("", "email").is_err());
        assert!(Namespace::new("1catalog", "email").is_err());
    }

    #[test]
    fn test_namespace_rejects_injection() {
        assert!(Namespace::new("x; DROP TABLE customers", "email").is_err());
        let ns = Namespace::new("c", "s").unwrap();
        assert!(ns.table("customers; --").is_err());
    }

    #[test]
    fn test_qualify_tool_name() {
        let ns = Namespace::new("marion_test", "email").unwrap();
        assert_eq!(
            ns.qualify("return_last_order"),
            "marion_test.email.return_last_order"
        );
    }

    #[test]
    fn test_table_name() {
        let ns = Namespace::new("marion_test", "email").unwrap();
        assert_eq!(ns.table("customers").unwrap(), "marion_test_email_customers");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("customers").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("t2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2t").is_err());
        assert!(validate_identifier("a b").is_err());
        assert!(validate_identifier("a'b").is_err());
    }
}
