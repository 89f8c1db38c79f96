//! Configuration data structures.
//!
//! Optional fields stay `Option` and unknown keys are captured in `extra`, so a
//! loaded config serializes back to exactly the document it was read from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of `s4tk.config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Where sources are read from and packages are written to.
    pub build_instructions: BuildInstructions,

    /// Flags that relax or tune the build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_settings: Option<BuildSettings>,

    /// String table defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_tables: Option<StringTableSettings>,

    /// Keys not defined by the schema.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Configuration {
    /// Returns the configured default string table path, if any.
    pub fn default_string_table_path(&self) -> Option<&str> {
        self.string_tables
            .as_ref()
            .and_then(|tables| tables.default_path.as_deref())
    }

    /// Sets the default string table path, creating `stringTables` if needed.
    pub fn set_default_string_table_path(&mut self, path: impl Into<String>) {
        self.string_tables
            .get_or_insert_with(StringTableSettings::default)
            .default_path = Some(path.into());
    }
}

/// Project-wide build path mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInstructions {
    /// Source directory, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Directories that built packages are written to.
    pub destinations: Vec<String>,

    /// Packages to build.
    pub packages: Vec<PackageInstructions>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A single package to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInstructions {
    /// Package filename without extension.
    pub filename: String,

    /// Glob patterns of files to include, relative to the source directory.
    pub include: Vec<String>,

    /// Glob patterns of files to leave out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Build behavior flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_packages: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_missing_source_files: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_resource_key_overrides: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_build_summary: Option<BuildSummary>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// How much detail the build summary contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSummary {
    None,
    Partial,
    Full,
}

/// String table defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringTableSettings {
    /// Locale new string tables are created for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    /// String table that new strings are added to, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<String>,

    /// Whether to copy the default locale into missing locales at build time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_missing_locales: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
