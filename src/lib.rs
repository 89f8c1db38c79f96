//! S4TK Project - manages the `s4tk.config.json` of a Sims 4 modding project.
//!
//! This library loads and validates the project config, scaffolds new projects
//! and persists changes such as the default string table. The editor it runs
//! in is reached only through the [`host`] and [`store`] traits; the CLI in
//! this crate is one such host.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod store;
pub mod strings;
pub mod validation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::config::loader::to_canonical_json;
use crate::config::{ConfigManager, ConfigWatcher, Configuration, LoadOptions, ManagerSettings};
use crate::error::ConfigError;
use crate::host::ConsoleHost;
use crate::store::LocalFileStore;
use crate::validation::{report, ValidationResult};

/// Runs the CLI with the provided arguments.
pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.log_level())?;

    let root = resolve_root(&cli.root);
    let host = Arc::new(ConsoleHost::new(cli.interactive));
    let manager = Arc::new(ConfigManager::new(
        root.clone(),
        Arc::new(LocalFileStore::new()),
        host.clone(),
        host,
        ManagerSettings {
            contact_url: cli.contact_url.clone(),
        },
    ));

    match cli.command {
        Commands::Watch => watch(manager, root.as_deref()).await,
        Commands::Load => load(&manager).await,
        Commands::Show => show(&manager).await,
        Commands::Init => init(&manager).await,
        Commands::SetDefaultStbl { path } => set_default_stbl(&manager, &path).await,
        Commands::Strings => list_strings(&manager, root.as_deref()).await,
    }
}

/// Initializes the tracing subscriber for structured logging.
fn setup_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(())
}

/// Canonicalizes the root; a root that doesn't exist counts as no open project.
fn resolve_root(root: &Path) -> Option<PathBuf> {
    match std::fs::canonicalize(root) {
        Ok(path) if path.is_dir() => Some(path),
        Ok(path) => {
            warn!(path = %path.display(), "Project root is not a directory");
            None
        }
        Err(e) => {
            warn!(path = %root.display(), error = %e, "Project root not found");
            None
        }
    }
}

/// Loads the config and reloads it on every save until Ctrl+C.
async fn watch(manager: Arc<ConfigManager>, root: Option<&Path>) -> Result<()> {
    let root = root.context("No project root to watch")?;

    let (watcher, events) = ConfigWatcher::new(root);
    let watcher = watcher.start().await.context("Failed to watch project root")?;

    let handle = manager.initialize(events).await;
    info!("Watching for config changes. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutdown signal received");
    // Dropping the watcher closes the event channel and ends the handler task.
    drop(watcher);
    handle.await.context("Config event handler panicked")?;
    Ok(())
}

/// Loads the config, printing the full validation report if it is rejected.
async fn load_with_report(manager: &ConfigManager) -> Result<Configuration> {
    let outcome = manager
        .load(LoadOptions {
            report_absence: true,
        })
        .await;

    if let Err(ConfigError::Schema { issues }) = &outcome {
        let result = ValidationResult::from_issues(issues.clone());
        eprintln!("{}", report::format_report(&result));
    }

    outcome.context("Config did not load")
}

/// Loads and validates the config once.
async fn load(manager: &ConfigManager) -> Result<()> {
    load_with_report(manager).await?;
    Ok(())
}

/// Prints the loaded config in canonical form.
async fn show(manager: &ConfigManager) -> Result<()> {
    let config = load_with_report(manager).await?;
    print!("{}", to_canonical_json(&config));
    Ok(())
}

/// Scaffolds a default project.
async fn init(manager: &ConfigManager) -> Result<()> {
    let path = manager
        .create_default_project()
        .await
        .context("Project was not created")?;
    println!("{}", path.display());
    Ok(())
}

/// Sets the default string table and saves the config.
async fn set_default_stbl(manager: &ConfigManager, path: &str) -> Result<()> {
    // A failed load is already reported; the setter then reports "not loaded".
    let _ = manager.load(LoadOptions::default()).await;
    manager
        .set_default_string_table_path(path)
        .await
        .context("Default string table was not saved")?;
    Ok(())
}

/// Lists string tables, marking the configured default.
async fn list_strings(manager: &ConfigManager, root: Option<&Path>) -> Result<()> {
    let root = root.context("No project root to scan")?;

    let loaded = manager.load(LoadOptions::default()).await.ok();
    let default_path = loaded
        .as_ref()
        .and_then(|config| config.default_string_table_path());

    let files = strings::discover(root, default_path);
    if files.is_empty() {
        println!("No string tables found.");
        return Ok(());
    }

    for file in files {
        let marker = if file.is_default { "*" } else { " " };
        println!("{} {}", marker, file.relative_path);
    }
    Ok(())
}
