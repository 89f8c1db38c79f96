//! Interfaces to the host environment (editor or CLI).
//!
//! The config manager never talks to a UI directly. It reports through a
//! [`Notifier`] and publishes state through a [`HostContext`].

pub mod console;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

pub use console::ConsoleHost;

/// Context key published whenever the loaded state changes.
pub const ACTIVE_CONTEXT_KEY: &str = "s4tk.workspace.active";

/// Buttons that can be attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Opens the contact page.
    GetHelp,
    /// Opens the contact page to report an internal failure.
    ReportProblem,
    /// Reloads the config, reporting if it's missing.
    ReloadConfig,
    /// Scaffolds a default project.
    CreateProject,
}

impl Action {
    /// Label shown on the button.
    pub fn label(&self) -> &'static str {
        match self {
            Action::GetHelp => "Get Help",
            Action::ReportProblem => "Report Problem",
            Action::ReloadConfig => "Reload Config",
            Action::CreateProject => "Create S4TK Project",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-facing messages.
///
/// `warn` and `error` resolve to the action the user picked, if any.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn info(&self, message: &str);

    async fn warn(&self, message: &str, actions: &[Action]) -> Option<Action>;

    async fn error(&self, message: &str, actions: &[Action]) -> Option<Action>;

    async fn open_external_link(&self, url: &str);
}

/// Host-side state the manager publishes to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostContext: Send + Sync {
    /// Sets a boolean context flag, e.g. to toggle UI visibility.
    fn set_context(&self, key: &str, value: bool);

    /// Opens a file for the user.
    async fn open_document(&self, path: &Path);
}
