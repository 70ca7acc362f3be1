use std::path::Path;
use std::sync::Arc;

use crate::domain::document::FunctionDoc;
use crate::domain::tree::OutlineEntry;
use crate::error::Result;

/// Reads one documentation record from disk.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<FunctionDoc>;
}

/// Purpose/summary text of the function documented by a generated `doc.md`.
pub trait ExcerptSource: Send + Sync {
    fn excerpt(&self, doc_path: &Path) -> Option<Arc<str>>;
}

/// Never has an excerpt; used when no generated documents exist.
pub struct NoExcerpts;

impl ExcerptSource for NoExcerpts {
    fn excerpt(&self, _doc_path: &Path) -> Option<Arc<str>> {
        None
    }
}

pub trait DocumentRenderer: Send + Sync {
    fn render_function(&self, doc: &FunctionDoc) -> String;
    fn render_dependencies(&self, callers: &[OutlineEntry], callees: &[OutlineEntry]) -> String;
}
