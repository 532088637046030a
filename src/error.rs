//! Error types for Toolbelt
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Toolbelt
#[derive(Debug, Error)]
pub enum ToolbeltError {
    /// Registration input violated a name or schema constraint
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    /// Invocation against a name that is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Required parameter missing or argument of the wrong type
    #[error("Argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// The backing relational store could not be reached
    #[error("Store unavailable: {0}")]
    UnderlyingStoreUnavailable(String),

    /// Failure from the underlying data source during execution
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Toolbelt operations
pub type Result<T> = std::result::Result<T, ToolbeltError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_specification_error() {
        let err = ToolbeltError::InvalidSpecification("empty tool name".to_string());
        assert_eq!(err.to_string(), "Invalid specification: empty tool name");
    }

    #[test]
    fn test_unknown_tool_error() {
        let err = ToolbeltError::UnknownTool("return_last_order".to_string());
        assert_eq!(err.to_string(), "Unknown tool: return_last_order");
    }

    #[test]
    fn test_argument_mismatch_error() {
        let err = ToolbeltError::ArgumentMismatch("missing customer_name".to_string());
        assert_eq!(err.to_string(), "Argument mismatch: missing customer_name");
    }

    #[test]
    fn test_store_unavailable_error() {
        let err = ToolbeltError::UnderlyingStoreUnavailable("cannot open db".to_string());
        assert_eq!(err.to_string(), "Store unavailable: cannot open db");
    }

    #[test]
    fn test_execution_error() {
        let err = ToolbeltError::Execution("no such table: purchases".to_string());
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ToolbeltError = io_err.into();
        assert!(matches!(err, ToolbeltError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ToolbeltError = json_err.into();
        assert!(matches!(err, ToolbeltError::Json(_)));
    }
}
