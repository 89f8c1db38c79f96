//! Default project layout.

use serde::Serialize;
use uuid::Uuid;

/// Output directory created for new projects.
pub const OUT_DIR: &str = "out";

/// Source directory created for new projects.
pub const SOURCE_DIR: &str = "src";

/// String table directory created for new projects.
pub const STRINGS_DIR: &str = "strings";

/// Placeholder string table, relative to the project root.
pub const DEFAULT_STRING_TABLE: &str = "strings/default.stbl.json";

/// Directories every new project gets.
pub const STANDARD_DIRS: [&str; 3] = [OUT_DIR, SOURCE_DIR, STRINGS_DIR];

const DEFAULT_CONFIG: &str = r#"{
  "buildInstructions": {
    "source": "src",
    "destinations": [
      "out"
    ],
    "packages": [
      {
        "filename": "build",
        "include": [
          "**/*"
        ]
      }
    ]
  },
  "buildSettings": {
    "allowEmptyPackages": false,
    "allowMissingSourceFiles": false,
    "allowResourceKeyOverrides": false,
    "outputBuildSummary": "partial"
  },
  "stringTables": {
    "defaultLocale": "English",
    "defaultPath": "strings/default.stbl.json",
    "generateMissingLocales": true
  }
}
"#;

/// Text written to a new project's config file.
pub fn default_config_document() -> &'static str {
    DEFAULT_CONFIG
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StringTableDocument {
    locale: &'static str,
    instance_base: String,
    entries: Vec<StringTableEntry>,
}

#[derive(Serialize)]
struct StringTableEntry {
    key: String,
    value: &'static str,
}

/// Generates a placeholder string table with a fresh instance and one entry.
pub fn generate_string_table() -> String {
    let instance_base = Uuid::new_v4().as_u128() as u64 & 0x00FF_FFFF_FFFF_FFFF;
    let key = Uuid::new_v4().as_u128() as u32;

    let document = StringTableDocument {
        locale: "English",
        instance_base: format!("0x{:016X}", instance_base),
        entries: vec![StringTableEntry {
            key: format!("0x{:08X}", key),
            value: "New string",
        }],
    };

    let mut text = serde_json::to_string_pretty(&document).unwrap_or_default();
    text.push('\n');
    text
}
