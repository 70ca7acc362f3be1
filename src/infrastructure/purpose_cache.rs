//! Memoised purpose/summary excerpts for cross-document links.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::infrastructure::discovery::SOURCE_FILE;
use crate::ports::{DocumentParser, ExcerptSource};

/// Loads the `doc.xml` next to a generated `doc.md` once per path.
///
/// Each path owns a cell that is filled once. The map shard is only locked to
/// fetch the cell; workers asking for the same document wait on the cell.
pub struct PurposeCache<'a> {
    parser: &'a dyn DocumentParser,
    excerpts: DashMap<PathBuf, Arc<OnceCell<Option<Arc<str>>>>>,
}

impl<'a> PurposeCache<'a> {
    pub fn new(parser: &'a dyn DocumentParser) -> Self {
        Self {
            parser,
            excerpts: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.excerpts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excerpts.is_empty()
    }

    fn load(&self, doc_path: &Path) -> Option<Arc<str>> {
        let source = doc_path.with_file_name(SOURCE_FILE);
        if !source.is_file() {
            return None;
        }
        match self.parser.parse(&source) {
            Ok(doc) => doc.excerpt().map(Arc::from),
            Err(e) => {
                log::debug!("No excerpt for {}: {}", source.display(), e);
                None
            }
        }
    }
}

impl ExcerptSource for PurposeCache<'_> {
    fn excerpt(&self, doc_path: &Path) -> Option<Arc<str>> {
        let existing = self.excerpts.get(doc_path).map(|cell| Arc::clone(cell.value()));
        let cell = existing.unwrap_or_else(|| {
            Arc::clone(self.excerpts.entry(doc_path.to_path_buf()).or_default().value())
        });
        cell.get_or_init(|| self.load(doc_path)).clone()
    }
}
