//! CLI module for toolbelt - command-line interface and subcommands.
//!
//! Provides the entry point with subcommands for seeding the demo store,
//! listing the registered toolset, and invoking tools by name.

pub mod commands;

pub use commands::Cli;
