//! Notification text for config lifecycle outcomes.
//!
//! Pure mappings: nothing here performs I/O, so every message can be checked
//! without a project on disk.

use crate::error::ConfigError;
use crate::host::Action;
use crate::validation::report;

/// How prominently a notice is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message for the user plus the buttons to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub actions: Vec<Action>,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>, actions: &[Action]) -> Self {
        Self {
            severity,
            message: message.into(),
            actions: actions.to_vec(),
        }
    }
}

const INVALID_PREFIX: &str = "Could not validate S4TK config. You will not be able to build \
     your project until all errors are resolved and the config has been reloaded.";

const REPORT_SUFFIX: &str = "This is likely a problem with S4TK. Please report it.";

/// Config loaded successfully.
pub fn loaded() -> Notice {
    Notice::new(Severity::Info, "Successfully loaded S4TK config.", &[])
}

/// Backing file was deleted.
pub fn unloaded() -> Notice {
    Notice::new(
        Severity::Warning,
        "S4TK config has been unloaded because its file was deleted.",
        &[],
    )
}

/// No config file (or no project) to load.
pub fn absent() -> Notice {
    Notice::new(
        Severity::Warning,
        "No S4TK config file was found at the root of this project.",
        &[Action::CreateProject],
    )
}

/// Default string table changed and was saved.
pub fn default_string_table_set(path: &str) -> Notice {
    Notice::new(
        Severity::Info,
        format!("Set '{}' as the default string table.", path),
        &[],
    )
}

/// Maps a failed operation to what the user is told.
pub fn for_error(error: &ConfigError) -> Notice {
    match error {
        ConfigError::NotFound { .. } => absent(),
        ConfigError::Syntax { message } => Notice::new(
            Severity::Error,
            format!("{} [{}]", INVALID_PREFIX, message),
            &[Action::GetHelp, Action::ReloadConfig],
        ),
        ConfigError::Schema { issues } => Notice::new(
            Severity::Error,
            format!("{} [{}]", INVALID_PREFIX, report::format_inline(issues)),
            &[Action::GetHelp, Action::ReloadConfig],
        ),
        ConfigError::Read { path, source } => Notice::new(
            Severity::Error,
            format!("Could not read S4TK config at '{}': {}", path.display(), source),
            &[Action::GetHelp, Action::ReloadConfig],
        ),
        ConfigError::AlreadyExists { .. } => Notice::new(
            Severity::Warning,
            "An S4TK config file already exists at the root of this project.",
            &[],
        ),
        ConfigError::NotLoaded => Notice::new(
            Severity::Error,
            "Cannot set the default string table because no S4TK config is currently loaded.",
            &[Action::ReloadConfig],
        ),
        ConfigError::ProjectRootMissing => Notice::new(
            Severity::Error,
            format!("S4TK could not locate the root of this project. {}", REPORT_SUFFIX),
            &[Action::ReportProblem],
        ),
        ConfigError::PathResolution { path, reason } => Notice::new(
            Severity::Error,
            format!(
                "S4TK could not resolve its config path under '{}' ({}). {}",
                path.display(),
                reason,
                REPORT_SUFFIX
            ),
            &[Action::ReportProblem],
        ),
        ConfigError::Write { path, source } => Notice::new(
            Severity::Error,
            format!("S4TK could not write '{}': {}. {}", path.display(), source, REPORT_SUFFIX),
            &[Action::ReportProblem],
        ),
        ConfigError::UnpersistedMutation { source } => {
            let inner = for_error(source);
            Notice::new(
                Severity::Error,
                format!("The change was applied but not saved. {}", inner.message),
                &inner.actions,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationIssue;
    use std::path::PathBuf;

    #[test]
    fn syntax_notice_embeds_parser_message() {
        let notice = for_error(&ConfigError::Syntax {
            message: "expected `,` or `}` at line 3 column 5".to_string(),
        });
        assert_eq!(notice.severity, Severity::Error);
        assert!(notice.message.ends_with("[expected `,` or `}` at line 3 column 5]"));
        assert_eq!(notice.actions, vec![Action::GetHelp, Action::ReloadConfig]);
    }

    #[test]
    fn schema_notice_lists_field_detail() {
        let notice = for_error(&ConfigError::Schema {
            issues: vec![
                ValidationIssue::error("buildInstructions", "Required property is missing"),
                ValidationIssue::error("stringTables.defaultPath", "Expected a string, found number"),
            ],
        });
        assert!(notice.message.contains("buildInstructions: Required property is missing"));
        assert!(notice
            .message
            .contains("stringTables.defaultPath: Expected a string, found number"));
    }

    #[test]
    fn missing_config_offers_project_creation() {
        let notice = for_error(&ConfigError::NotFound {
            path: PathBuf::from("/p/s4tk.config.json"),
        });
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.actions, vec![Action::CreateProject]);
    }

    #[test]
    fn internal_failures_ask_for_a_report() {
        for error in [
            ConfigError::ProjectRootMissing,
            ConfigError::PathResolution {
                path: PathBuf::new(),
                reason: "empty".to_string(),
            },
        ] {
            assert_eq!(for_error(&error).actions, vec![Action::ReportProblem]);
        }
    }

    #[test]
    fn unpersisted_mutation_wraps_cause() {
        let notice = for_error(&ConfigError::UnpersistedMutation {
            source: Box::new(ConfigError::ProjectRootMissing),
        });
        assert!(notice.message.starts_with("The change was applied but not saved."));
        assert_eq!(notice.actions, vec![Action::ReportProblem]);
    }

    #[test]
    fn not_loaded_offers_reload() {
        let notice = for_error(&ConfigError::NotLoaded);
        assert_eq!(notice.actions, vec![Action::ReloadConfig]);
    }
}
