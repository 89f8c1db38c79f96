//! Error types for the S4TK project manager.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Configuration lifecycle errors.
///
/// Every operation on [`crate::config::ConfigManager`] reports these to the user
/// before returning them, so callers are free to ignore them.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No config file found at '{path}'")]
    NotFound { path: PathBuf },

    #[error("Config is not valid JSON: {message}")]
    Syntax { message: String },

    #[error("Config failed schema validation with {} error(s)", .issues.len())]
    Schema { issues: Vec<ValidationIssue> },

    #[error("No project root is open")]
    ProjectRootMissing,

    #[error("Could not resolve config path under '{path}': {reason}")]
    PathResolution { path: PathBuf, reason: String },

    #[error("A config file already exists at '{path}'")]
    AlreadyExists { path: PathBuf },

    #[error("No config is currently loaded")]
    NotLoaded,

    #[error("Failed to read config file '{path}': {source}")]
    Read { path: PathBuf, source: StoreError },

    #[error("Failed to write '{path}': {source}")]
    Write { path: PathBuf, source: StoreError },

    /// The in-memory config was changed but could not be written back.
    #[error("Config changed in memory but was not saved: {source}")]
    UnpersistedMutation { source: Box<ConfigError> },
}

/// File store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    /// Maps an IO error, keeping `NotFound` distinct.
    pub fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Config file watcher errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to watch directory '{path}': {message}")]
    WatchFailed { path: PathBuf, message: String },

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}
