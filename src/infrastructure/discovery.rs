//! Document discovery: `doc.xml` inputs and `func_*` marker files.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::link::DocLookup;

pub const SOURCE_FILE: &str = "doc.xml";
pub const OUTPUT_FILE: &str = "doc.md";
pub const MARKER_PREFIX: &str = "func_";

fn is_marker(name: &str) -> bool {
    name.starts_with(MARKER_PREFIX)
}

/// Every `doc.xml` below `root`, sorted.
pub fn find_documents(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == SOURCE_FILE)
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// Map every `func_*` marker below `root` to the `doc.md` next to it.
pub fn build_doc_lookup(root: &Path) -> DocLookup {
    let mut markers: Vec<(String, PathBuf)> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !is_marker(&name) {
                return None;
            }
            let dir = entry.path().parent()?.to_path_buf();
            Some((name, dir.join(OUTPUT_FILE)))
        })
        .collect();
    // Deterministic winner when one id is marked in several directories.
    markers.sort();

    let mut lookup = DocLookup::new();
    for (id, doc) in markers.into_iter().rev() {
        lookup.insert(id, doc);
    }
    log::debug!("Found {} documented functions under {}", lookup.len(), root.display());
    lookup
}

/// The function id a document directory is marked with: its first `func_*` file.
pub fn function_marker(dir: &Path) -> Option<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot list {}: {}", dir.display(), e);
            return None;
        }
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| is_marker(name))
        .min()
}
