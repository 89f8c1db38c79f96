//! Recording host fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use s4tk_project::config::{ConfigManager, ManagerSettings, CONFIG_FILENAME};
use s4tk_project::host::{Action, HostContext, Notifier};
use s4tk_project::store::MemoryFileStore;

pub const ROOT: &str = "/project";

pub const VALID_CONFIG: &str = r#"{
  "buildInstructions": {
    "source": "src",
    "destinations": ["out"],
    "packages": [{ "filename": "build", "include": ["**/*"] }]
  },
  "stringTables": { "defaultPath": "/old" }
}"#;

pub fn root() -> PathBuf {
    PathBuf::from(ROOT)
}

pub fn config_path() -> PathBuf {
    root().join(CONFIG_FILENAME)
}

/// A notification as the user would have seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Info(String),
    Warn(String, Vec<Action>),
    Error(String, Vec<Action>),
    Link(String),
}

/// Records notifications and answers with scripted action choices.
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Shown>>,
    answers: Mutex<VecDeque<Option<Action>>>,
}

impl RecordingNotifier {
    /// Queues the action picked for the next warning or error.
    pub fn answer(&self, action: Option<Action>) {
        self.answers.lock().unwrap().push_back(action);
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(String, Vec<Action>)> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::Error(message, actions) => Some((message, actions)),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<(String, Vec<Action>)> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::Warn(message, actions) => Some((message, actions)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.shown.lock().unwrap().clear();
    }

    fn next_answer(&self) -> Option<Action> {
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn info(&self, message: &str) {
        self.shown.lock().unwrap().push(Shown::Info(message.to_string()));
    }

    async fn warn(&self, message: &str, actions: &[Action]) -> Option<Action> {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Warn(message.to_string(), actions.to_vec()));
        self.next_answer()
    }

    async fn error(&self, message: &str, actions: &[Action]) -> Option<Action> {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Error(message.to_string(), actions.to_vec()));
        self.next_answer()
    }

    async fn open_external_link(&self, url: &str) {
        self.shown.lock().unwrap().push(Shown::Link(url.to_string()));
    }
}

/// Records context flags and opened documents.
#[derive(Default)]
pub struct RecordingHost {
    flags: Mutex<Vec<(String, bool)>>,
    opened: Mutex<Vec<PathBuf>>,
}

impl RecordingHost {
    pub fn last_flag(&self, key: &str) -> Option<bool> {
        self.flags
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostContext for RecordingHost {
    fn set_context(&self, key: &str, value: bool) {
        self.flags.lock().unwrap().push((key.to_string(), value));
    }

    async fn open_document(&self, path: &Path) {
        self.opened.lock().unwrap().push(path.to_path_buf());
    }
}

/// A manager over an in-memory project with recording fakes.
pub struct Harness {
    pub manager: Arc<ConfigManager>,
    pub store: MemoryFileStore,
    pub notifier: Arc<RecordingNotifier>,
    pub host: Arc<RecordingHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_root(Some(root()))
    }

    pub fn with_root(root: Option<PathBuf>) -> Self {
        let store = MemoryFileStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let host = Arc::new(RecordingHost::default());
        let manager = Arc::new(ConfigManager::new(
            root,
            Arc::new(store.clone()),
            notifier.clone(),
            host.clone(),
            ManagerSettings::default(),
        ));

        Self {
            manager,
            store,
            notifier,
            host,
        }
    }

    /// Same as `new`, with `contents` already in the config file.
    pub fn with_config(contents: &str) -> Self {
        let harness = Self::new();
        harness.store.insert(config_path(), contents);
        harness
    }
}
