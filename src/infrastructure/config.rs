//! Configuration file support.
//!
//! ```toml
//! [extract]
//! constructor-name = "New"
//! unrepresentable = "any"   # or "error"
//! exported-only = false
//!
//! [runtime]
//! jobs = 4
//! log = "info"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::options::ExtractOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AppConfig {
    pub extract: ExtractOptions,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Batch workers; one per core when unset.
    pub jobs: Option<usize>,
    /// Log filter directives, e.g. `info` or `service_ast=debug`.
    pub log: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
