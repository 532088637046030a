//! Tool system - specifications, registry, manifest loading, and the builtin
//! customer-service toolset.

pub mod builtin;
mod definition;
mod invocation;
mod manifest;
mod query;
mod registry;

pub use definition::{
    ColumnSpec, Execution, NativeFn, ParamSpec, ReturnShape, ScalarType, ScalarValue,
    ToolDefinition, ToolSpecification,
};
pub use invocation::{Table, ToolArgs, ToolResult, validate_args};
pub use manifest::ToolManifest;
pub use query::QueryTemplate;
pub use registry::{RegistrationResult, ToolRegistry};
