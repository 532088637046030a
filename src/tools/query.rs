//! Parameterized query templates for the declarative tool variant.
//!
//! A template never embeds namespace names directly in its text. Table
//! references are written as `{table}` tokens and resolved against the
//! namespace at render time, with every identifier validated before it is
//! spliced; argument values bind at `:name` placeholders and stay out of the
//! query text entirely.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolbeltError};
use crate::namespace::{Namespace, validate_identifier};

/// A SQL body with `{table}` references and `:param` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTemplate {
    sql: String,
}

impl QueryTemplate {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// The raw template text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// All `{table}` references, in order of appearance
    pub fn table_refs(&self) -> Result<Vec<String>> {
        let mut refs = Vec::new();
        let mut rest = self.sql.as_str();

        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                ToolbeltError::InvalidSpecification(
                    "unterminated '{' table reference in query template".to_string(),
                )
            })?;
            let name = &after[..end];
            validate_identifier(name)?;
            refs.push(name.to_string());
            rest = &after[end + 1..];
        }

        Ok(refs)
    }

    /// Whether the template binds the given named parameter.
    ///
    /// Matches the whole placeholder token: `:customer` does not count as
    /// bound by a template that only mentions `:customer_name`.
    pub fn binds(&self, param: &str) -> bool {
        let token = format!(":{}", param);
        let mut search = self.sql.as_str();

        while let Some(pos) = search.find(&token) {
            let after = &search[pos + token.len()..];
            match after.chars().next() {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => search = after,
                _ => return true,
            }
        }
        false
    }

    /// Resolve table references against the namespace, yielding executable SQL.
    ///
    /// Parameter placeholders are left in place for the driver to bind.
    pub fn render(&self, namespace: &Namespace) -> Result<String> {
        let mut out = String::with_capacity(self.sql.len());
        let mut rest = self.sql.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                ToolbeltError::InvalidSpecification(
                    "unterminated '{' table reference in query template".to_string(),
                )
            })?;
            out.push_str(&namespace.table(&after[..end])?);
            rest = &after[end + 1..];
        }
        out.push_str(rest);

        Ok(out)
    }
}
