//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - seed: create and populate the demo customer tables
//! - list: show the registered toolset
//! - describe: show one tool's prompt-visible definition
//! - invoke: call a tool with key=value arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use toolbelt::tools::{ScalarValue, ToolArgs};

/// Toolbelt - typed tool registry for LLM agents over a customer dataset
#[derive(Parser, Debug)]
#[command(name = "toolbelt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Catalog part of the namespace
    #[arg(long, global = true, default_value = "marion_test")]
    pub catalog: String,

    /// Schema part of the namespace
    #[arg(long, global = true, default_value = "email")]
    pub schema: String,

    /// Extra query tools to register from a TOML manifest
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the workshop tables and load the embedded demo dataset
    Seed,

    /// List the registered toolset
    List,

    /// Show a tool's prompt-visible definition
    Describe {
        /// Tool name
        tool: String,
    },

    /// Invoke a tool
    Invoke {
        /// Tool name
        tool: String,

        /// Arguments as key=value pairs
        #[arg(value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
}

/// Parse `key=value` pairs into tool arguments.
///
/// Values parse as bool, then integer, then float, then fall back to text;
/// declared-type validation happens inside the registry.
pub fn parse_args(pairs: &[String]) -> eyre::Result<ToolArgs> {
    let mut args = ToolArgs::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| eyre::eyre!("argument '{}' is not of the form key=value", pair))?;

        let value = if let Ok(b) = raw.parse::<bool>() {
            ScalarValue::Boolean(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            ScalarValue::Integer(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            ScalarValue::Float(f)
        } else {
            ScalarValue::Text(raw.to_string())
        };
        args.insert(key, value);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_text() {
        let args = parse_args(&["customer_name=david sanchez".to_string()]).unwrap();
        assert_eq!(
            args.get("customer_name"),
            Some(&ScalarValue::Text("david sanchez".to_string()))
        );
    }

    #[test]
    fn test_parse_args_typed() {
        let args = parse_args(&[
            "count=3".to_string(),
            "ratio=0.5".to_string(),
            "flag=true".to_string(),
        ])
        .unwrap();
        assert_eq!(args.get("count"), Some(&ScalarValue::Integer(3)));
        assert_eq!(args.get("ratio"), Some(&ScalarValue::Float(0.5)));
        assert_eq!(args.get("flag"), Some(&ScalarValue::Boolean(true)));
    }

    #[test]
    fn test_parse_args_rejects_bare_key() {
        assert!(parse_args(&["customer_name".to_string()]).is_err());
    }
}
