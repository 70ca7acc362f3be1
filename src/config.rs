//! Converter settings, loaded from TOML and overridable from the command line.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::domain::tree::TreeLimits;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Depth limit of caller/callee outlines, in edges.
    pub max_depth: usize,
    /// Expanded neighbours per outline node.
    pub max_children: usize,
    /// Worker threads for directory conversion.
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let limits = TreeLimits::default();
        Self {
            max_depth: limits.max_depth,
            max_children: limits.max_children,
            jobs: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the contents of `path` when given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides; `None` keeps the current value.
    pub fn with_overrides(
        mut self,
        max_depth: Option<usize>,
        max_children: Option<usize>,
        jobs: Option<usize>,
    ) -> Result<Self> {
        if let Some(max_depth) = max_depth {
            self.max_depth = max_depth;
        }
        if let Some(max_children) = max_children {
            self.max_children = max_children;
        }
        if jobs.is_some() {
            self.jobs = jobs;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            bail!("max_depth must be at least 1");
        }
        if self.jobs == Some(0) {
            bail!("jobs must be at least 1");
        }
        Ok(())
    }

    pub fn limits(&self) -> TreeLimits {
        TreeLimits {
            max_depth: self.max_depth,
            max_children: self.max_children,
        }
    }
}
