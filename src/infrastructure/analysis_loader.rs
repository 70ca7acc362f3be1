//! Analysis Loader
//!
//! Loads the static-analysis result into a [`FunctionIndex`]. Indices are
//! memoised per canonical path for the lifetime of the process so a batch run
//! ingests each analysis file once.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::domain::index::FunctionIndex;

static INDEX_CACHE: Lazy<DashMap<PathBuf, Arc<FunctionIndex>>> = Lazy::new(DashMap::new);

pub struct AnalysisLoader;

impl AnalysisLoader {
    /// Load (or reuse) the index for `path`.
    pub fn load(path: &Path) -> Result<Arc<FunctionIndex>> {
        let key = path
            .canonicalize()
            .with_context(|| format!("Analysis file not found: {}", path.display()))?;

        if let Some(index) = INDEX_CACHE.get(&key) {
            log::debug!("Reusing cached index for {}", key.display());
            return Ok(Arc::clone(&index));
        }

        let index = Arc::new(Self::load_uncached(&key)?);
        let cached = INDEX_CACHE.entry(key).or_insert(index);
        Ok(Arc::clone(&cached))
    }

    /// Read and index `path` without consulting the cache.
    pub fn load_uncached(path: &Path) -> Result<FunctionIndex> {
        log::info!("Loading analysis from: {}", path.display());
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read analysis file {}", path.display()))?;
        let index = FunctionIndex::from_slice(&bytes)
            .with_context(|| format!("Failed to index {}", path.display()))?;
        Ok(index)
    }
}
