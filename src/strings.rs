//! String table discovery within a project.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::scaffold::OUT_DIR;

/// File name patterns of string table resources.
const STRING_TABLE_PATTERNS: &[&str] = &["*.stbl", "*.stbl.json"];

/// A string table found in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTableFile {
    /// Path relative to the project root, with `/` separators.
    pub relative_path: String,
    /// Whether the config names this file as the default.
    pub is_default: bool,
}

/// Finds string tables under `root`, skipping build output and hidden directories.
///
/// `default_path` is compared against each file's root-relative path.
pub fn discover(root: &Path, default_path: Option<&str>) -> Vec<StringTableFile> {
    let patterns: Vec<glob::Pattern> = STRING_TABLE_PATTERNS
        .iter()
        .filter_map(|p| glob::Pattern::new(p).ok())
        .collect();

    let default_path = default_path.map(normalize);

    let walker = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

    let mut files: Vec<StringTableFile> = walker
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches_patterns(entry.path(), &patterns))
        .filter_map(|entry| relative_to(root, entry.path()))
        .map(|relative_path| StringTableFile {
            is_default: default_path.as_deref() == Some(relative_path.as_str()),
            relative_path,
        })
        .collect();

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    info!(count = files.len(), root = ?root, "Scanned string tables");
    files
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let skipped = name.starts_with('.') || (entry.depth() == 1 && name == OUT_DIR);
    if skipped {
        debug!(path = ?entry.path(), "Skipping directory");
    }
    skipped
}

fn matches_patterns(path: &Path, patterns: &[glob::Pattern]) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    patterns.iter().any(|p| p.matches(filename))
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    Some(normalize(&relative.to_string_lossy()))
}

/// Uses `/` separators and drops a leading `./`.
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}
