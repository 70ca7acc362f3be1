//! Labels and cross-document links for outline entries.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::domain::index::FunctionIndex;
use crate::ports::ExcerptSource;

/// Turns a function id into display text. Resolution never fails.
pub trait LabelResolver: Send + Sync {
    fn resolve(&self, id: &str) -> String;
}

/// Labels every node with its bare id.
pub struct IdLabels;

impl LabelResolver for IdLabels {
    fn resolve(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Function id -> generated Markdown document.
#[derive(Debug, Clone, Default)]
pub struct DocLookup {
    docs: HashMap<String, PathBuf>,
}

impl DocLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, doc_path: impl Into<PathBuf>) {
        self.docs.insert(id.into(), doc_path.into());
    }

    pub fn get(&self, id: &str) -> Option<&Path> {
        self.docs.get(id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Resolves labels for outlines written into one document.
///
/// Order of preference: link to the target's generated document (with its
/// purpose excerpt), then the source location, then the bare name/id.
pub struct LinkResolver<'a> {
    index: &'a FunctionIndex,
    docs: Option<&'a DocLookup>,
    excerpts: &'a dyn ExcerptSource,
    /// The document being written, always resolvable even if absent from `docs`.
    current: Option<(&'a str, &'a Path)>,
    base_dir: PathBuf,
}

impl<'a> LinkResolver<'a> {
    /// `base_dir` is the directory of the document the links will be written into.
    pub fn new(
        index: &'a FunctionIndex,
        docs: Option<&'a DocLookup>,
        excerpts: &'a dyn ExcerptSource,
        base_dir: &Path,
    ) -> Self {
        Self {
            index,
            docs,
            excerpts,
            current: None,
            base_dir: absolute(base_dir),
        }
    }

    pub fn with_current(mut self, id: &'a str, doc_path: &'a Path) -> Self {
        self.current = Some((id, doc_path));
        self
    }

    fn doc_for(&self, id: &str) -> Option<&'a Path> {
        if let Some(path) = self.docs.and_then(|docs| docs.get(id)) {
            return Some(path);
        }
        match self.current {
            Some((current_id, path)) if current_id == id => Some(path),
            _ => None,
        }
    }
}

impl LabelResolver for LinkResolver<'_> {
    fn resolve(&self, id: &str) -> String {
        let Some(record) = self.index.get(id) else {
            return id.to_string();
        };
        let title = match record.name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => format!("{} ({})", name, id),
            None => id.to_string(),
        };

        if let Some(doc) = self.doc_for(id) {
            let link = relative_link(&absolute(doc), &self.base_dir);
            return match self.excerpts.excerpt(doc) {
                Some(excerpt) => format!("[{}]({}): {}", title, link, single_line(&excerpt)),
                None => format!("[{}]({})", title, link),
            };
        }

        match (&record.location.file, record.location.line) {
            (Some(file), Some(line)) => format!("{} @ {}:{}", title, file, line),
            (Some(file), None) => format!("{} @ {}", title, file),
            _ => title,
        }
    }
}

/// Fold multi-line text so a label stays on one bullet line.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Relative path from directory `base` to `target`, `/`-separated.
/// Both paths should be absolute (or relative to the same directory).
pub fn relative_link(target: &Path, base: &Path) -> String {
    let target: Vec<Component> = normalize(target);
    let base: Vec<Component> = normalize(base);

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    for component in &target[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FunctionRecord;
    use std::sync::Arc;

    struct FixedExcerpts(HashMap<PathBuf, &'static str>);

    impl ExcerptSource for FixedExcerpts {
        fn excerpt(&self, doc_path: &Path) -> Option<Arc<str>> {
            self.0.get(doc_path).map(|s| Arc::from(*s))
        }
    }

    fn sample_index() -> FunctionIndex {
        FunctionIndex::from_records(vec![
            FunctionRecord::new("func_1").with_name("parse"),
            FunctionRecord::new("func_2")
                .with_name("emit")
                .with_location("src/emit.c", Some(12)),
            FunctionRecord::new("func_3"),
        ])
    }

    #[test]
    fn test_relative_link() {
        assert_eq!(
            relative_link(Path::new("/docs/a/func/doc.md"), Path::new("/docs/b")),
            "../a/func/doc.md"
        );
        assert_eq!(
            relative_link(Path::new("/docs/b/doc.md"), Path::new("/docs/b")),
            "doc.md"
        );
        assert_eq!(
            relative_link(Path::new("/docs/./x/../y/doc.md"), Path::new("/docs")),
            "y/doc.md"
        );
    }

    #[test]
    fn test_resolution_prefers_document_link() {
        let index = sample_index();
        let mut docs = DocLookup::new();
        docs.insert("func_1", "/out/parse/doc.md");
        docs.insert("func_2", "/out/emit/doc.md");
        let excerpts = FixedExcerpts(HashMap::from([(
            PathBuf::from("/out/parse/doc.md"),
            "Parse the input",
        )]));
        let resolver = LinkResolver::new(&index, Some(&docs), &excerpts, Path::new("/out/main"));

        assert_eq!(
            resolver.resolve("func_1"),
            "[parse (func_1)](../parse/doc.md): Parse the input"
        );
        assert_eq!(resolver.resolve("func_2"), "[emit (func_2)](../emit/doc.md)");
    }

    #[test]
    fn test_multi_line_excerpt_folded() {
        let index = sample_index();
        let mut docs = DocLookup::new();
        docs.insert("func_1", "/out/parse/doc.md");
        let excerpts = FixedExcerpts(HashMap::from([(
            PathBuf::from("/out/parse/doc.md"),
            "Line one.\n  Line two.\n\nLine three.",
        )]));
        let resolver = LinkResolver::new(&index, Some(&docs), &excerpts, Path::new("/out/main"));

        assert_eq!(
            resolver.resolve("func_1"),
            "[parse (func_1)](../parse/doc.md): Line one. Line two. Line three."
        );
    }

    #[test]
    fn test_resolution_degrades_gracefully() {
        let index = sample_index();
        let excerpts = FixedExcerpts(HashMap::new());
        let resolver = LinkResolver::new(&index, None, &excerpts, Path::new("/out"));

        assert_eq!(resolver.resolve("func_2"), "emit (func_2) @ src/emit.c:12");
        assert_eq!(resolver.resolve("func_1"), "parse (func_1)");
        assert_eq!(resolver.resolve("func_3"), "func_3");
        assert_eq!(resolver.resolve("nowhere"), "nowhere");
    }

    #[test]
    fn test_current_document_always_linkable() {
        let index = sample_index();
        let excerpts = FixedExcerpts(HashMap::new());
        let own = PathBuf::from("/out/parse/doc.md");
        let resolver = LinkResolver::new(&index, None, &excerpts, Path::new("/out/parse"))
            .with_current("func_1", &own);
        assert_eq!(resolver.resolve("func_1"), "[parse (func_1)](doc.md)");
    }
}
