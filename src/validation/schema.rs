//! Schema validation for the `s4tk.config.json` document.
//!
//! Runs on the raw JSON value rather than the typed model so that every
//! violation can be reported with the path of the offending field.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{ValidationIssue, ValidationResult};

const TOP_LEVEL_KEYS: &[&str] = &["buildInstructions", "buildSettings", "stringTables"];

const BUILD_INSTRUCTION_KEYS: &[&str] = &["source", "destinations", "packages"];

const PACKAGE_KEYS: &[&str] = &["filename", "include", "exclude"];

const BUILD_SETTING_KEYS: &[&str] = &[
    "allowEmptyPackages",
    "allowMissingSourceFiles",
    "allowResourceKeyOverrides",
    "outputBuildSummary",
];

const STRING_TABLE_KEYS: &[&str] = &["defaultLocale", "defaultPath", "generateMissingLocales"];

/// Accepted values for `buildSettings.outputBuildSummary`.
pub const BUILD_SUMMARY_LEVELS: &[&str] = &["none", "partial", "full"];

/// Locales a string table can be written for.
pub const STRING_TABLE_LOCALES: &[&str] = &[
    "English",
    "ChineseTraditional",
    "Czech",
    "Danish",
    "Dutch",
    "Finnish",
    "French",
    "German",
    "Italian",
    "Japanese",
    "Korean",
    "Norwegian",
    "Polish",
    "Portuguese",
    "Russian",
    "Spanish",
    "Swedish",
    "ChineseSimplified",
];

/// Characters that can't appear in a package filename.
const FILENAME_PATTERN: &str = r#"^[^<>:"/\\|?*\x00-\x1F]+$"#;

fn filename_regex() -> &'static Regex {
    static FILENAME: OnceLock<Regex> = OnceLock::new();
    FILENAME.get_or_init(|| Regex::new(FILENAME_PATTERN).expect("filename pattern is valid"))
}

/// Validates the structure of a config document (required fields, types, enums).
pub fn validate(document: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();

    let root = match document.as_object() {
        Some(root) => root,
        None => {
            result.add(ValidationIssue::error(
                "(root)",
                format!("Config must be a JSON object, found {}", type_name(document)),
            ));
            return result;
        }
    };

    check_unknown_keys("", root, TOP_LEVEL_KEYS, &mut result);

    match root.get("buildInstructions") {
        Some(value) => validate_build_instructions(value, &mut result),
        None => result.add(
            ValidationIssue::error("buildInstructions", "Required property is missing")
                .with_suggestion("Add a buildInstructions object with destinations and packages"),
        ),
    }

    if let Some(value) = root.get("buildSettings") {
        validate_build_settings(value, &mut result);
    }

    if let Some(value) = root.get("stringTables") {
        validate_string_tables(value, &mut result);
    }

    result
}

fn validate_build_instructions(value: &Value, result: &mut ValidationResult) {
    let Some(instructions) = expect_object("buildInstructions", value, result) else {
        return;
    };

    check_unknown_keys("buildInstructions", instructions, BUILD_INSTRUCTION_KEYS, result);

    if let Some(source) = instructions.get("source") {
        expect_string("buildInstructions.source", source, result);
    }

    match instructions.get("destinations") {
        Some(destinations) => {
            if let Some(items) = expect_array("buildInstructions.destinations", destinations, result) {
                if items.is_empty() {
                    result.add(
                        ValidationIssue::error(
                            "buildInstructions.destinations",
                            "At least one destination is required",
                        )
                        .with_suggestion("Add an output directory such as \"out\""),
                    );
                }
                for (i, item) in items.iter().enumerate() {
                    let path = format!("buildInstructions.destinations[{}]", i);
                    if let Some(dest) = expect_string(&path, item, result) {
                        if dest.trim().is_empty() {
                            result.add(ValidationIssue::error(path, "Destination cannot be empty"));
                        }
                    }
                }
            }
        }
        None => result.add(ValidationIssue::error(
            "buildInstructions.destinations",
            "Required property is missing",
        )),
    }

    match instructions.get("packages") {
        Some(packages) => {
            if let Some(items) = expect_array("buildInstructions.packages", packages, result) {
                for (i, item) in items.iter().enumerate() {
                    validate_package(&format!("buildInstructions.packages[{}]", i), item, result);
                }
            }
        }
        None => result.add(ValidationIssue::error(
            "buildInstructions.packages",
            "Required property is missing",
        )),
    }
}

fn validate_package(prefix: &str, value: &Value, result: &mut ValidationResult) {
    let Some(package) = expect_object(prefix, value, result) else {
        return;
    };

    check_unknown_keys(prefix, package, PACKAGE_KEYS, result);

    let filename_path = format!("{}.filename", prefix);
    match package.get("filename") {
        Some(filename) => {
            if let Some(name) = expect_string(&filename_path, filename, result) {
                if name.trim().is_empty() {
                    result.add(ValidationIssue::error(filename_path, "Package filename cannot be empty"));
                } else if !filename_regex().is_match(name) {
                    result.add(
                        ValidationIssue::error(
                            filename_path,
                            format!("Package filename '{}' contains reserved characters", name),
                        )
                        .with_suggestion("Filenames cannot contain path separators or any of <>:\"|?*"),
                    );
                }
            }
        }
        None => result.add(ValidationIssue::error(filename_path, "Required property is missing")),
    }

    let include_path = format!("{}.include", prefix);
    match package.get("include") {
        Some(include) => {
            if let Some(patterns) = validate_patterns(&include_path, include, result) {
                if patterns == 0 {
                    result.add(ValidationIssue::error(
                        include_path,
                        "At least one include pattern is required",
                    ));
                }
            }
        }
        None => result.add(ValidationIssue::error(include_path, "Required property is missing")),
    }

    if let Some(exclude) = package.get("exclude") {
        validate_patterns(&format!("{}.exclude", prefix), exclude, result);
    }
}

/// Checks an array of glob patterns, returning how many entries it holds.
fn validate_patterns(prefix: &str, value: &Value, result: &mut ValidationResult) -> Option<usize> {
    let items = expect_array(prefix, value, result)?;

    for (i, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", prefix, i);
        if let Some(pattern) = expect_string(&path, item, result) {
            if let Err(e) = glob::Pattern::new(pattern) {
                result.add(ValidationIssue::error(
                    path,
                    format!("Invalid glob pattern '{}': {}", pattern, e.msg),
                ));
            }
        }
    }

    Some(items.len())
}

fn validate_build_settings(value: &Value, result: &mut ValidationResult) {
    let Some(settings) = expect_object("buildSettings", value, result) else {
        return;
    };

    check_unknown_keys("buildSettings", settings, BUILD_SETTING_KEYS, result);

    for key in ["allowEmptyPackages", "allowMissingSourceFiles", "allowResourceKeyOverrides"] {
        if let Some(flag) = settings.get(key) {
            expect_bool(&format!("buildSettings.{}", key), flag, result);
        }
    }

    if let Some(summary) = settings.get("outputBuildSummary") {
        expect_one_of("buildSettings.outputBuildSummary", summary, BUILD_SUMMARY_LEVELS, result);
    }
}

fn validate_string_tables(value: &Value, result: &mut ValidationResult) {
    let Some(tables) = expect_object("stringTables", value, result) else {
        return;
    };

    check_unknown_keys("stringTables", tables, STRING_TABLE_KEYS, result);

    if let Some(path) = tables.get("defaultPath") {
        expect_string("stringTables.defaultPath", path, result);
    }

    if let Some(locale) = tables.get("defaultLocale") {
        expect_one_of("stringTables.defaultLocale", locale, STRING_TABLE_LOCALES, result);
    }

    if let Some(flag) = tables.get("generateMissingLocales") {
        expect_bool("stringTables.generateMissingLocales", flag, result);
    }
}

/// Warns about keys the schema doesn't define. They are kept, not rejected.
fn check_unknown_keys(
    prefix: &str,
    object: &Map<String, Value>,
    known: &[&str],
    result: &mut ValidationResult,
) {
    for key in object.keys() {
        if known.contains(&key.as_str()) {
            continue;
        }

        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        let mut issue = ValidationIssue::warning(path, format!("Unknown property '{}'", key));
        if let Some(similar) = find_similar_key(key, known) {
            issue = issue.with_suggestion(format!("Did you mean '{}'?", similar));
        }
        result.add(issue);
    }
}

/// Finds a known key close enough to be a likely typo.
fn find_similar_key<'a>(input: &str, known: &[&'a str]) -> Option<&'a str> {
    known
        .iter()
        .map(|k| (*k, strsim::levenshtein(&input.to_lowercase(), &k.to_lowercase())))
        .filter(|(_, distance)| *distance <= 3)
        .min_by_key(|(_, distance)| *distance)
        .map(|(k, _)| k)
}

fn expect_object<'a>(
    path: &str,
    value: &'a Value,
    result: &mut ValidationResult,
) -> Option<&'a Map<String, Value>> {
    if value.is_object() {
        value.as_object()
    } else {
        result.add(type_mismatch(path, "an object", value));
        None
    }
}

fn expect_array<'a>(path: &str, value: &'a Value, result: &mut ValidationResult) -> Option<&'a Vec<Value>> {
    if value.is_array() {
        value.as_array()
    } else {
        result.add(type_mismatch(path, "an array", value));
        None
    }
}

fn expect_string<'a>(path: &str, value: &'a Value, result: &mut ValidationResult) -> Option<&'a str> {
    if value.is_string() {
        value.as_str()
    } else {
        result.add(type_mismatch(path, "a string", value));
        None
    }
}

fn expect_bool(path: &str, value: &Value, result: &mut ValidationResult) {
    if !value.is_boolean() {
        result.add(type_mismatch(path, "a boolean", value));
    }
}

fn expect_one_of(path: &str, value: &Value, allowed: &[&str], result: &mut ValidationResult) {
    let Some(actual) = expect_string(path, value, result) else {
        return;
    };

    if !allowed.contains(&actual) {
        let mut issue = ValidationIssue::error(path, format!("'{}' is not an allowed value", actual));
        issue = match find_similar_key(actual, allowed) {
            Some(similar) => issue.with_suggestion(format!("Did you mean '{}'?", similar)),
            None => issue.with_suggestion(format!("Expected one of: {}", allowed.join(", "))),
        };
        result.add(issue);
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> ValidationIssue {
    ValidationIssue::error(path, format!("Expected {}, found {}", expected, type_name(value)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "buildInstructions": {
                "destinations": ["out"],
                "packages": [{ "filename": "build", "include": ["**/*"] }]
            }
        })
    }

    fn error_paths(result: &ValidationResult) -> Vec<String> {
        result.errors().map(|i| i.path.clone()).collect()
    }

    #[test]
    fn accepts_minimal_document() {
        let result = validate(&minimal());
        assert!(result.is_valid());
        assert_eq!(result.warnings().count(), 0);
    }

    #[test]
    fn rejects_non_object_root() {
        let result = validate(&json!([1, 2, 3]));
        assert_eq!(error_paths(&result), vec!["(root)"]);
    }

    #[test]
    fn reports_missing_build_instructions() {
        let result = validate(&json!({ "stringTables": { "defaultPath": "strings/a.stbl.json" } }));
        assert_eq!(error_paths(&result), vec!["buildInstructions"]);
    }

    #[test]
    fn reports_every_violation_with_its_path() {
        let document = json!({
            "buildInstructions": {
                "destinations": [],
                "packages": [
                    { "filename": "a/b", "include": ["[unclosed"] },
                    { "include": [] }
                ]
            },
            "stringTables": { "defaultPath": 42 }
        });

        let result = validate(&document);
        let paths = error_paths(&result);
        assert!(paths.contains(&"buildInstructions.destinations".to_string()));
        assert!(paths.contains(&"buildInstructions.packages[0].filename".to_string()));
        assert!(paths.contains(&"buildInstructions.packages[0].include[0]".to_string()));
        assert!(paths.contains(&"buildInstructions.packages[1].filename".to_string()));
        assert!(paths.contains(&"buildInstructions.packages[1].include".to_string()));
        assert!(paths.contains(&"stringTables.defaultPath".to_string()));
        assert_eq!(result.error_count(), 6);
    }

    #[test]
    fn null_is_not_an_absent_value() {
        let mut document = minimal();
        document["stringTables"] = json!({ "defaultPath": null });

        let result = validate(&document);
        let issue = result.errors().next().expect("one error");
        assert_eq!(issue.path, "stringTables.defaultPath");
        assert_eq!(issue.message, "Expected a string, found null");
    }

    #[test]
    fn unknown_keys_warn_with_suggestion() {
        let mut document = minimal();
        document["stringTable"] = json!({});

        let result = validate(&document);
        assert!(result.is_valid());
        let warning = result.warnings().next().expect("one warning");
        assert_eq!(warning.path, "stringTable");
        assert_eq!(warning.suggestion.as_deref(), Some("Did you mean 'stringTables'?"));
    }

    #[test]
    fn rejects_unknown_locale_and_summary_level() {
        let mut document = minimal();
        document["stringTables"] = json!({ "defaultLocale": "Englsh" });
        document["buildSettings"] = json!({ "outputBuildSummary": "verbose", "allowEmptyPackages": "yes" });

        let result = validate(&document);
        let locale = result
            .errors()
            .find(|i| i.path == "stringTables.defaultLocale")
            .expect("locale error");
        assert_eq!(locale.suggestion.as_deref(), Some("Did you mean 'English'?"));
        assert!(result
            .errors()
            .any(|i| i.path == "buildSettings.outputBuildSummary"));
        assert!(result
            .errors()
            .any(|i| i.path == "buildSettings.allowEmptyPackages"));
    }
}
