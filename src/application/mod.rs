//! Conversion use cases: one document, or every document below a directory.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::domain::index::{Direction, FunctionIndex};
use crate::domain::link::{DocLookup, LinkResolver};
use crate::domain::tree::{OutlineEntry, TreeLimits, TreeRenderer};
use crate::error::{ConvertError, Result};
use crate::infrastructure::discovery::{self, OUTPUT_FILE};
use crate::ports::{DocumentParser, DocumentRenderer, ExcerptSource};

/// Call-graph data available while converting.
#[derive(Clone, Copy)]
pub struct DependencyContext<'a> {
    pub index: &'a FunctionIndex,
    /// Generated documents that outlines may link to.
    pub docs: Option<&'a DocLookup>,
}

/// Outcome of a directory conversion.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ConvertUsecase<'a> {
    pub parser: &'a dyn DocumentParser,
    pub renderer: &'a dyn DocumentRenderer,
    pub excerpts: &'a dyn ExcerptSource,
    pub limits: TreeLimits,
}

impl<'a> ConvertUsecase<'a> {
    /// Convert one `doc.xml` to Markdown, appending caller/callee outlines when
    /// the document is marked with a function id that has edges in the index.
    pub fn convert(&self, xml_path: &Path, deps: Option<DependencyContext<'_>>) -> Result<String> {
        let doc = self.parser.parse(xml_path)?;
        let markdown = self.renderer.render_function(&doc);

        match deps.and_then(|deps| self.dependency_section(xml_path, deps)) {
            Some(section) => Ok(format!("{}\n\n{}", markdown, section)),
            None => Ok(markdown),
        }
    }

    fn dependency_section(&self, xml_path: &Path, deps: DependencyContext<'_>) -> Option<String> {
        let dir = document_dir(xml_path);
        let func_id = discovery::function_marker(dir)?;
        if !deps.index.has_edges(&func_id) {
            log::debug!("{} has no callers or callees", func_id);
            return None;
        }

        let own_doc = xml_path.with_file_name(OUTPUT_FILE);
        let (callers, callees) = self.outlines(deps, dir, &func_id, &own_doc);
        Some(self.renderer.render_dependencies(&callers, &callees))
    }

    fn outlines(
        &self,
        deps: DependencyContext<'_>,
        dir: &Path,
        func_id: &str,
        own_doc: &Path,
    ) -> (Vec<OutlineEntry>, Vec<OutlineEntry>) {
        let labels = LinkResolver::new(deps.index, deps.docs, self.excerpts, dir)
            .with_current(func_id, own_doc);
        let tree = TreeRenderer::new(deps.index, &labels, self.limits);
        let start = [func_id];
        (
            tree.render(&start, Direction::Callers),
            tree.render(&start, Direction::Callees),
        )
    }

    /// Convert and write `doc.md` for one source file.
    pub fn convert_to_file(&self, xml_path: &Path, deps: Option<DependencyContext<'_>>) -> Result<PathBuf> {
        let markdown = self.convert(xml_path, deps)?;
        let output = xml_path.with_file_name(OUTPUT_FILE);
        fs::write(&output, markdown).map_err(|e| ConvertError::io(&output, e))?;
        Ok(output)
    }

    /// Convert every `doc.xml` below `root` in parallel. A failing document does
    /// not stop the others.
    pub fn process_directory(&self, root: &Path, index: Option<&FunctionIndex>) -> BatchReport {
        let docs = index.map(|_| discovery::build_doc_lookup(root));
        let deps = index.map(|index| DependencyContext {
            index,
            docs: docs.as_ref(),
        });

        let sources = discovery::find_documents(root);
        log::info!("Converting {} documents under {}", sources.len(), root.display());

        let results: Vec<(PathBuf, Result<PathBuf>)> = sources
            .into_par_iter()
            .map(|source| {
                let result = self.convert_to_file(&source, deps);
                (source, result)
            })
            .collect();

        let mut report = BatchReport::default();
        for (source, result) in results {
            match result {
                Ok(output) => report.generated.push(output),
                Err(e) => {
                    log::error!("Failed to convert {}: {}", source.display(), e);
                    report.failed.push((source, e.to_string()));
                }
            }
        }
        report
    }
}

/// Directory holding `xml_path`; `.` for a bare file name.
fn document_dir(xml_path: &Path) -> &Path {
    match xml_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
