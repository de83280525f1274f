//! TOML configuration file.
//!
//! ```toml
//! [kucoin]
//! page_size = 200
//!
//! [export]
//! output = "exports/"
//! since = "2024-01-01"
//! before = "2024-07-01"
//! ```
//!
//! Every table and key is optional.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradexport_core::importer::KuCoinOptions;
use tradexport_core::ChunkWindow;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [kucoin] settings in {}: {reason}", path.display())]
    InvalidKuCoin { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub kucoin: KuCoinOptions,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    /// File or directory; resolved with `resolve_output_path`.
    pub output: Option<PathBuf>,
    /// First day included.
    pub since: Option<NaiveDate>,
    /// First day excluded. Not after `since` selects nothing.
    pub before: Option<NaiveDate>,
}

impl ExportConfig {
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .kucoin
            .validate()
            .map_err(|reason| ConfigError::InvalidKuCoin {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(path, &raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn window(&self) -> ChunkWindow {
        ChunkWindow::from_dates(self.export.since, self.export.before)
    }
}
