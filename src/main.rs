use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use cli::commands::{Commands, parse_args};
use toolbelt::namespace::Namespace;
use toolbelt::store::SqliteStore;
use toolbelt::tools::{ToolManifest, ToolRegistry, builtin};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolbelt")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("toolbelt.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolbelt");
    fs::create_dir_all(&dir).context("Failed to create data directory")?;
    Ok(dir.join("toolbelt.db"))
}

fn build_registry(cli: &Cli) -> Result<ToolRegistry> {
    let namespace = Namespace::new(cli.catalog.clone(), cli.schema.clone())
        .context("Invalid namespace")?;

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    store.create_tables(&namespace).context("Failed to create tables")?;

    let mut registry = ToolRegistry::new(namespace, store);
    for spec in builtin::all() {
        registry.register(spec)?;
    }

    if let Some(path) = &cli.manifest {
        let manifest = ToolManifest::from_file(path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?;
        manifest.register_all(&mut registry)?;
        info!("Registered {} manifest tools", manifest.len());
    }

    Ok(registry)
}

fn run_application(cli: &Cli) -> Result<()> {
    info!("Starting application");

    if cli.verbose {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let mut registry = build_registry(cli)?;

    match &cli.command {
        Commands::Seed => handle_seed_command(&mut registry),
        Commands::List => handle_list_command(&registry, cli.verbose),
        Commands::Describe { tool } => handle_describe_command(&registry, tool),
        Commands::Invoke { tool, args } => handle_invoke_command(&registry, tool, args),
    }
}

fn handle_seed_command(registry: &mut ToolRegistry) -> Result<()> {
    let namespace = registry.namespace().clone();
    registry.store().seed_demo(&namespace)?;
    println!("{} {}", "Seeded demo dataset into".green(), namespace.to_string().cyan());
    Ok(())
}

fn handle_list_command(registry: &ToolRegistry, verbose: bool) -> Result<()> {
    for def in registry.toolset() {
        println!("{}  {}", def.name.cyan().bold(), def.description);
        if verbose {
            println!("{}", serde_json::to_string_pretty(&def.input_schema)?);
        }
    }
    Ok(())
}

fn handle_describe_command(registry: &ToolRegistry, tool: &str) -> Result<()> {
    let spec = registry
        .get(tool)
        .ok_or_else(|| eyre::eyre!("Unknown tool: {}", tool))?;
    let def = toolbelt::tools::ToolDefinition::from_spec(spec);
    println!("{}", serde_json::to_string_pretty(&def)?);
    Ok(())
}

fn handle_invoke_command(registry: &ToolRegistry, tool: &str, raw_args: &[String]) -> Result<()> {
    let args = parse_args(raw_args)?;
    let result = registry
        .invoke(tool, &args)
        .with_context(|| format!("Invocation of '{}' failed", tool))?;
    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(())
}

fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();
    if let Err(e) = run_application(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
