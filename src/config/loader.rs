//! Configuration document parsing and serialization.

use serde_json::Value;

use super::model::Configuration;
use crate::error::ConfigError;
use crate::validation::validate_document;

/// Parses and validates raw config bytes.
///
/// JSON syntax errors surface the parser's message; schema violations carry
/// every error-level issue. Warnings are logged and do not block loading.
pub fn parse_config(bytes: &[u8]) -> Result<Configuration, ConfigError> {
    let document: Value = serde_json::from_slice(bytes).map_err(|e| ConfigError::Syntax {
        message: e.to_string(),
    })?;

    let result = validate_document(&document);

    for issue in result.warnings() {
        tracing::warn!(
            path = %issue.path,
            message = %issue.message,
            suggestion = ?issue.suggestion,
            "Config validation warning"
        );
    }

    if !result.is_valid() {
        return Err(ConfigError::Schema {
            issues: result.into_errors(),
        });
    }

    // The schema pass covers every field the model reads; this only fails if
    // the two drift apart.
    serde_json::from_value(document).map_err(|e| ConfigError::Schema {
        issues: vec![crate::validation::ValidationIssue::error("(root)", e.to_string())],
    })
}

/// Serializes a config to its canonical on-disk text: two-space indented JSON
/// with a trailing newline.
pub fn to_canonical_json(config: &Configuration) -> String {
    // Serializing plain structs and JSON values into a String can't fail.
    let mut text = serde_json::to_string_pretty(config).unwrap_or_default();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID: &str = r#"{
        "buildInstructions": {
            "source": "src",
            "destinations": ["out", "../Mods/MyMod"],
            "packages": [{ "filename": "build", "include": ["**/*"], "exclude": ["drafts/**"] }]
        },
        "buildSettings": { "allowEmptyPackages": true, "outputBuildSummary": "partial" },
        "stringTables": { "defaultLocale": "English", "defaultPath": "strings/default.stbl.json" }
    }"#;

    #[test]
    fn parsed_config_matches_document() {
        let config = parse_config(VALID.as_bytes()).unwrap();
        let document: Value = serde_json::from_str(VALID).unwrap();

        assert_eq!(serde_json::to_value(&config).unwrap(), document);
        assert_eq!(config.default_string_table_path(), Some("strings/default.stbl.json"));
    }

    #[test]
    fn syntax_error_carries_parser_message() {
        let bytes = br#"{ "buildInstructions": { "destinations": ["out"], } }"#;
        let expected = serde_json::from_slice::<Value>(bytes).unwrap_err().to_string();

        match parse_config(bytes) {
            Err(ConfigError::Syntax { message }) => assert_eq!(message, expected),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn schema_error_lists_each_violation() {
        let bytes = serde_json::to_vec(&json!({
            "buildInstructions": { "destinations": "out" },
            "stringTables": { "defaultPath": ["not", "a", "string"] }
        }))
        .unwrap();

        match parse_config(&bytes) {
            Err(ConfigError::Schema { issues }) => {
                let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
                assert_eq!(
                    paths,
                    vec![
                        "buildInstructions.destinations",
                        "buildInstructions.packages",
                        "stringTables.defaultPath",
                    ]
                );
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn canonical_json_round_trips() {
        let config = parse_config(VALID.as_bytes()).unwrap();
        let text = to_canonical_json(&config);

        assert!(text.starts_with("{\n  \"buildInstructions\""));
        assert!(text.ends_with("}\n"));
        assert_eq!(parse_config(text.as_bytes()).unwrap(), config);
    }
}
