//! Config lifecycle: load, validate, invalidate and persist.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::hot_reload::FileEvent;
use super::loader::{parse_config, to_canonical_json};
use super::model::Configuration;
use super::notice::{self, Notice, Severity};
use super::scaffold;
use crate::error::{ConfigError, StoreError};
use crate::host::{Action, HostContext, Notifier, ACTIVE_CONTEXT_KEY};
use crate::store::FileStore;

/// Name of the config file at the project root.
pub const CONFIG_FILENAME: &str = "s4tk.config.json";

/// Page opened by "Get Help" and "Report Problem".
pub const DEFAULT_CONTACT_URL: &str = "https://frankkulak.com/s4tk/contact";

/// Whether a project config is in effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigState {
    #[default]
    Unloaded,
    Loaded(Configuration),
}

impl ConfigState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ConfigState::Loaded(_))
    }
}

/// Options for [`ConfigManager::load`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Tell the user when there is no config file to load.
    pub report_absence: bool,
}

/// Host-provided settings for the manager.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Page opened by help and problem-report actions.
    pub contact_url: String,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            contact_url: DEFAULT_CONTACT_URL.to_string(),
        }
    }
}

/// Owns the loaded project config.
///
/// Every state change goes through one assignment helper, which also
/// publishes the active flag to the host. Load and read-modify-write
/// sequences hold the state lock from start to finish; notifications are sent
/// after it's released so that a chosen action can call back in.
pub struct ConfigManager {
    state: Mutex<ConfigState>,
    project_root: RwLock<Option<PathBuf>>,
    store: Arc<dyn FileStore>,
    notifier: Arc<dyn Notifier>,
    host: Arc<dyn HostContext>,
    settings: ManagerSettings,
}

type Respond<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

impl ConfigManager {
    /// Creates a manager in the `Unloaded` state.
    pub fn new(
        project_root: Option<PathBuf>,
        store: Arc<dyn FileStore>,
        notifier: Arc<dyn Notifier>,
        host: Arc<dyn HostContext>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            state: Mutex::new(ConfigState::Unloaded),
            project_root: RwLock::new(project_root),
            store,
            notifier,
            host,
            settings,
        }
    }

    /// Subscribes to project file events, then loads the config once.
    ///
    /// Events are handled until the sender side of `events` is dropped.
    pub async fn initialize(
        self: &Arc<Self>,
        mut events: mpsc::UnboundedReceiver<FileEvent>,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                manager.handle_event(&event).await;
            }
            debug!("Project event stream closed");
        });

        let _ = self.load(LoadOptions::default()).await;
        handle
    }

    /// Reacts to a save or delete in the project root.
    pub async fn handle_event(&self, event: &FileEvent) {
        let Ok(config_path) = self.config_path() else {
            return;
        };
        if !event.paths().iter().any(|p| p == &config_path) {
            return;
        }

        match event {
            FileEvent::Saved(_) => {
                info!("Config file saved, reloading");
                let _ = self.load(LoadOptions::default()).await;
            }
            FileEvent::Deleted(_) => {
                {
                    let mut state = self.state.lock().await;
                    self.assign(&mut state, ConfigState::Unloaded);
                }
                warn!("Config file deleted, project unloaded");
                self.notify(notice::unloaded()).await;
            }
        }
    }

    /// Loads and validates the config file, replacing the current state.
    ///
    /// Failures are reported to the user before being returned.
    pub async fn load(&self, options: LoadOptions) -> Result<Configuration, ConfigError> {
        let outcome = self.load_locked().await;

        match &outcome {
            Ok(_) => self.notify(notice::loaded()).await,
            Err(e @ (ConfigError::NotFound { .. } | ConfigError::ProjectRootMissing)) => {
                debug!(reason = %e, "No config to load");
                if options.report_absence {
                    self.notify(notice::absent()).await;
                }
            }
            Err(e) => self.report(e).await,
        }

        outcome
    }

    async fn load_locked(&self) -> Result<Configuration, ConfigError> {
        let mut state = self.state.lock().await;
        self.assign(&mut state, ConfigState::Unloaded);

        let path = self.config_path()?;
        if !self.store.exists(&path).await {
            return Err(ConfigError::NotFound { path });
        }

        let bytes = self.store.read_bytes(&path).await.map_err(|e| match e {
            StoreError::NotFound { path } => ConfigError::NotFound { path },
            other => ConfigError::Read {
                path: path.clone(),
                source: other,
            },
        })?;

        let config = parse_config(&bytes)?;
        info!(path = %path.display(), "Config loaded");
        self.assign(&mut state, ConfigState::Loaded(config.clone()));
        Ok(config)
    }

    /// Writes a default config and project layout, then loads it.
    ///
    /// Does nothing but warn if a config file already exists.
    pub async fn create_default_project(&self) -> Result<PathBuf, ConfigError> {
        let outcome = self.create_default_project_inner().await;
        if let Err(e) = &outcome {
            self.report(e).await;
        }
        outcome
    }

    async fn create_default_project_inner(&self) -> Result<PathBuf, ConfigError> {
        let root = self.resolved_root()?;
        let config_path = root.join(CONFIG_FILENAME);

        if self.store.exists(&config_path).await {
            return Err(ConfigError::AlreadyExists { path: config_path });
        }

        info!(root = %root.display(), "Creating default project");

        let write_config = async {
            self.store
                .write_bytes(&config_path, scaffold::default_config_document().as_bytes())
                .await
                .map_err(|source| ConfigError::Write {
                    path: config_path.clone(),
                    source,
                })?;
            self.host.open_document(&config_path).await;
            let _ = self.load(LoadOptions::default()).await;
            Ok::<_, ConfigError>(())
        };

        let (config_written, layout_written) =
            tokio::join!(write_config, self.create_layout(&root));

        config_written?;
        if let Err(e) = layout_written {
            // The config itself is in place, so the project is still usable.
            error!(error = %e, "Failed to create project layout");
            self.report(&e).await;
        }

        Ok(config_path)
    }

    async fn create_layout(&self, root: &Path) -> Result<(), ConfigError> {
        for dir in scaffold::STANDARD_DIRS {
            let path = root.join(dir);
            self.store
                .create_directory(&path)
                .await
                .map_err(|source| ConfigError::Write { path, source })?;
        }

        let stbl_path = root.join(scaffold::DEFAULT_STRING_TABLE);
        if !self.store.exists(&stbl_path).await {
            self.store
                .write_bytes(&stbl_path, scaffold::generate_string_table().as_bytes())
                .await
                .map_err(|source| ConfigError::Write {
                    path: stbl_path.clone(),
                    source,
                })?;
            debug!(path = %stbl_path.display(), "Wrote placeholder string table");
        }

        Ok(())
    }

    /// Points `stringTables.defaultPath` at `path` and saves the config.
    ///
    /// If saving fails the in-memory change is kept and
    /// [`ConfigError::UnpersistedMutation`] is returned: memory and disk
    /// disagree until the next load.
    pub async fn set_default_string_table_path(&self, path: &str) -> Result<(), ConfigError> {
        let outcome = self.set_default_string_table_path_locked(path).await;
        match &outcome {
            Ok(()) => self.notify(notice::default_string_table_set(path)).await,
            Err(e) => self.report(e).await,
        }
        outcome
    }

    async fn set_default_string_table_path_locked(&self, path: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock().await;

        let mut config = match &*state {
            ConfigState::Loaded(config) => config.clone(),
            ConfigState::Unloaded => return Err(ConfigError::NotLoaded),
        };
        config.set_default_string_table_path(path);
        let text = to_canonical_json(&config);
        self.assign(&mut state, ConfigState::Loaded(config));

        let unpersisted = |source: ConfigError| {
            warn!(error = %source, "Default string table set in memory only");
            ConfigError::UnpersistedMutation {
                source: Box::new(source),
            }
        };

        let config_path = self.config_path().map_err(unpersisted)?;
        self.store
            .write_bytes(&config_path, text.as_bytes())
            .await
            .map_err(|source| {
                unpersisted(ConfigError::Write {
                    path: config_path.clone(),
                    source,
                })
            })?;

        info!(path, "Default string table saved");
        Ok(())
    }

    /// Carries out an action the user picked on a notification.
    pub fn respond(&self, action: Option<Action>) -> Respond<'_> {
        Box::pin(async move {
            let Some(action) = action else {
                return;
            };
            debug!(%action, "Handling notification action");

            match action {
                Action::GetHelp | Action::ReportProblem => {
                    self.notifier.open_external_link(&self.settings.contact_url).await;
                }
                Action::ReloadConfig => {
                    let _ = self.load(LoadOptions { report_absence: true }).await;
                }
                Action::CreateProject => {
                    let _ = self.create_default_project().await;
                }
            }
        })
    }

    /// Returns the loaded config, if any.
    pub async fn current(&self) -> Option<Configuration> {
        match &*self.state.lock().await {
            ConfigState::Loaded(config) => Some(config.clone()),
            ConfigState::Unloaded => None,
        }
    }

    /// Returns a snapshot of the state.
    pub async fn state(&self) -> ConfigState {
        self.state.lock().await.clone()
    }

    /// Returns true while a config is loaded.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.is_loaded()
    }

    /// Returns the open project root.
    pub fn project_root(&self) -> Option<PathBuf> {
        self.project_root.read().ok().and_then(|root| root.clone())
    }

    /// Changes the open project root. The loaded state is left as is.
    pub fn set_project_root(&self, root: Option<PathBuf>) {
        if let Ok(mut current) = self.project_root.write() {
            *current = root;
        }
    }

    /// Resolves the config file location under the project root.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.resolved_root()?.join(CONFIG_FILENAME))
    }

    fn resolved_root(&self) -> Result<PathBuf, ConfigError> {
        let root = self.project_root().ok_or(ConfigError::ProjectRootMissing)?;
        if root.as_os_str().is_empty() {
            return Err(ConfigError::PathResolution {
                path: root,
                reason: "project root is empty".to_string(),
            });
        }
        if root.file_name().is_none() && root.parent().is_some() {
            return Err(ConfigError::PathResolution {
                path: root,
                reason: "project root does not name a directory".to_string(),
            });
        }
        Ok(root)
    }

    /// Replaces the state and publishes the active flag.
    fn assign(&self, slot: &mut MutexGuard<'_, ConfigState>, next: ConfigState) {
        let active = next.is_loaded();
        **slot = next;
        self.host.set_context(ACTIVE_CONTEXT_KEY, active);
        debug!(active, "Config state assigned");
    }

    async fn report(&self, error: &ConfigError) {
        match error {
            ConfigError::AlreadyExists { .. } | ConfigError::NotFound { .. } => {
                warn!(error = %error, "Config operation skipped")
            }
            _ => error!(error = %error, "Config operation failed"),
        }
        self.notify(notice::for_error(error)).await;
    }

    async fn notify(&self, notice: Notice) {
        let picked = match notice.severity {
            Severity::Info => {
                self.notifier.info(&notice.message).await;
                None
            }
            Severity::Warning => self.notifier.warn(&notice.message, &notice.actions).await,
            Severity::Error => self.notifier.error(&notice.message, &notice.actions).await,
        };
        self.respond(picked).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHostContext, MockNotifier};
    use crate::store::MemoryFileStore;

    const VALID: &str = r#"{
        "buildInstructions": { "destinations": ["out"], "packages": [] },
        "stringTables": { "defaultPath": "/old" }
    }"#;

    fn root() -> PathBuf {
        PathBuf::from("/project")
    }

    fn quiet_host() -> MockHostContext {
        let mut host = MockHostContext::new();
        host.expect_set_context().returning(|_, _| ());
        host.expect_open_document().returning(|_| ());
        host
    }

    fn manager(store: &MemoryFileStore, notifier: MockNotifier, host: MockHostContext) -> ConfigManager {
        ConfigManager::new(
            Some(root()),
            Arc::new(store.clone()),
            Arc::new(notifier),
            Arc::new(host),
            ManagerSettings::default(),
        )
    }

    #[tokio::test]
    async fn syntax_error_notifies_once_with_parser_message() {
        let store = MemoryFileStore::new();
        store.insert(root().join(CONFIG_FILENAME), "{ not json");

        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|message: &str, actions: &[Action]| {
                message.contains("key must be a string")
                    && actions == [Action::GetHelp, Action::ReloadConfig]
            })
            .times(1)
            .returning(|_, _| None);

        let manager = manager(&store, notifier, quiet_host());
        let outcome = manager.load(LoadOptions::default()).await;

        assert!(matches!(outcome, Err(ConfigError::Syntax { .. })));
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn every_assignment_publishes_active_flag() {
        let store = MemoryFileStore::new();
        store.insert(root().join(CONFIG_FILENAME), VALID);

        let mut host = MockHostContext::new();
        let mut seq = mockall::Sequence::new();
        host.expect_set_context()
            .withf(|key: &str, active: &bool| key == ACTIVE_CONTEXT_KEY && !*active)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| ());
        host.expect_set_context()
            .withf(|key: &str, active: &bool| key == ACTIVE_CONTEXT_KEY && *active)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| ());

        let mut notifier = MockNotifier::new();
        notifier.expect_info().times(1).returning(|_| ());

        let manager = manager(&store, notifier, host);
        let config = manager.load(LoadOptions::default()).await.unwrap();
        assert_eq!(config.default_string_table_path(), Some("/old"));
    }

    #[tokio::test]
    async fn absent_config_is_silent_unless_requested() {
        let store = MemoryFileStore::new();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_warn()
            .withf(|_: &str, actions: &[Action]| actions == [Action::CreateProject])
            .times(1)
            .returning(|_, _| None);

        let manager = manager(&store, notifier, quiet_host());
        assert!(matches!(
            manager.load(LoadOptions::default()).await,
            Err(ConfigError::NotFound { .. })
        ));
        assert!(matches!(
            manager.load(LoadOptions { report_absence: true }).await,
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn help_action_opens_contact_page() {
        let store = MemoryFileStore::new();
        store.insert(root().join(CONFIG_FILENAME), "[]");

        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .times(1)
            .returning(|_, _| Some(Action::GetHelp));
        notifier
            .expect_open_external_link()
            .withf(|url: &str| url == DEFAULT_CONTACT_URL)
            .times(1)
            .returning(|_| ());

        let manager = manager(&store, notifier, quiet_host());
        assert!(matches!(
            manager.load(LoadOptions::default()).await,
            Err(ConfigError::Schema { .. })
        ));
    }

    #[test]
    fn root_without_name_is_unresolvable() {
        let manager = ConfigManager::new(
            Some(PathBuf::from("/project/..")),
            Arc::new(MemoryFileStore::new()),
            Arc::new(MockNotifier::new()),
            Arc::new(MockHostContext::new()),
            ManagerSettings::default(),
        );
        assert!(matches!(
            manager.config_path(),
            Err(ConfigError::PathResolution { .. })
        ));

        manager.set_project_root(None);
        assert!(matches!(manager.config_path(), Err(ConfigError::ProjectRootMissing)));
    }
}
