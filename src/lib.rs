//! Toolbelt - a typed tool registry for LLM agents
//!
//! Toolbelt lets a language-model-driven caller invoke named, typed,
//! side-effecting operations: parameterized queries over a SQLite-backed
//! customer dataset, a vector-search forwarder, and native scalar functions.
//! The registry is the contract surface; retrieval ranking and agent
//! reasoning stay behind external collaborators.

pub mod error;
pub mod namespace;
pub mod retrieval;
pub mod store;
pub mod tools;

pub use error::{Result, ToolbeltError};
