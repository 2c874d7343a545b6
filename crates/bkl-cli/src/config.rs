use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use bkl_append::AppendConfig;

/// Settings read from `--config`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BklConfig {
    /// Store root used when neither `--root` nor `BKL_ROOT` is given.
    pub root: PathBuf,
    pub append: AppendSection,
}

impl Default for BklConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            append: AppendSection::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppendSection {
    pub max_backoff_secs: Option<u64>,
    pub gzip: bool,
}

impl BklConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parsing configuration")
    }

    /// Load `path`, or the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The command line wins over the file.
    pub fn resolve_root(&self, cli_root: Option<PathBuf>) -> PathBuf {
        cli_root.unwrap_or_else(|| self.root.clone())
    }

    /// Appender settings, with command-line overrides applied.
    pub fn append_config(&self, gzip: bool, max_backoff_secs: Option<u64>) -> AppendConfig {
        let mut config = AppendConfig::default().with_gzip(gzip || self.append.gzip);
        if let Some(secs) = max_backoff_secs.or(self.append.max_backoff_secs) {
            config = config.with_max_backoff(Duration::from_secs(secs));
        }
        config
    }
}
