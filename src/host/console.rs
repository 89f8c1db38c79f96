//! Terminal host used by the CLI.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{Action, HostContext, Notifier};

/// Prints notifications to stderr and, when interactive, lets the user pick
/// an action by number.
pub struct ConsoleHost {
    /// Whether to prompt for actions on stdin.
    interactive: bool,
    /// Published context flags.
    context: Mutex<BTreeMap<String, bool>>,
}

impl ConsoleHost {
    /// Creates a new console host.
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            context: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the last value published for a context key.
    pub fn context_value(&self, key: &str) -> Option<bool> {
        self.context.lock().ok().and_then(|flags| flags.get(key).copied())
    }

    /// Prints a message with its action list and waits for a choice.
    async fn show(&self, level: &str, message: &str, actions: &[Action]) -> Option<Action> {
        eprintln!("[{}] {}", level, message);

        if actions.is_empty() {
            return None;
        }

        let choices = actions
            .iter()
            .enumerate()
            .map(|(i, action)| format!("[{}] {}", i + 1, action))
            .collect::<Vec<_>>()
            .join("  ");

        if !self.interactive {
            eprintln!("    {}", choices);
            return None;
        }

        eprint!("    {}  (Enter to dismiss): ", choices);
        let _ = std::io::stderr().flush();

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match line {
            Ok(Ok(line)) => parse_choice(&line, actions),
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read action choice");
                None
            }
            Err(e) => {
                warn!(error = %e, "Action prompt task failed");
                None
            }
        }
    }
}

#[async_trait]
impl Notifier for ConsoleHost {
    async fn info(&self, message: &str) {
        info!(%message, "Notification");
        eprintln!("[info] {}", message);
    }

    async fn warn(&self, message: &str, actions: &[Action]) -> Option<Action> {
        warn!(%message, "Notification");
        self.show("warning", message, actions).await
    }

    async fn error(&self, message: &str, actions: &[Action]) -> Option<Action> {
        error!(%message, "Notification");
        self.show("error", message, actions).await
    }

    async fn open_external_link(&self, url: &str) {
        info!(%url, "Opening external link");
        eprintln!("Visit {}", url);
    }
}

#[async_trait]
impl HostContext for ConsoleHost {
    fn set_context(&self, key: &str, value: bool) {
        debug!(key, value, "Context updated");
        if let Ok(mut flags) = self.context.lock() {
            flags.insert(key.to_string(), value);
        }
    }

    async fn open_document(&self, path: &Path) {
        info!(path = %path.display(), "Opening document");
        eprintln!("Created {}", path.display());
    }
}

/// Maps a 1-based choice typed by the user to an action.
fn parse_choice(input: &str, actions: &[Action]) -> Option<Action> {
    let index: usize = input.trim().parse().ok()?;
    index.checked_sub(1).and_then(|i| actions.get(i)).copied()
}
