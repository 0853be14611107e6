//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in a
//! config file; command-line flags take precedence:
//!
//! ```toml
//! # prism-combine.toml
//! [combine]
//! mode = "fdr"
//! q_threshold = 0.05        # or "none"
//! delimiter = "\t"
//! store = "sqlite"
//! database = "combined.db"
//! output = "combined_results.csv.gz"
//! keep_decoys = false
//! decoy_sentinel = "true"
//! binding_rank_threshold = 2.0
//! extension = "csv"
//! ```

use anyhow::Result;
use prism_combine::CombineError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for prism-combine.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Combine settings.
    #[serde(default)]
    pub combine: CombineSection,
}

/// Q threshold as written in a config file: a number or `"none"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum QSetting {
    /// Exclusive upper bound on the best Q.
    Value(f64),
    /// Keyword, only `none` is accepted.
    Keyword(String),
}

impl QSetting {
    /// Resolve to a threshold; `None` disables filtering.
    pub fn threshold(&self) -> Result<Option<f64>> {
        match self {
            QSetting::Value(q) => Ok(Some(*q)),
            QSetting::Keyword(k) if k.eq_ignore_ascii_case("none") => Ok(None),
            QSetting::Keyword(k) => Err(CombineError::Config(format!(
                "invalid q_threshold '{}' in config file: expected a number or \"none\"",
                k
            ))
            .into()),
        }
    }
}

/// Configuration for the combine, discover and validate commands.
#[derive(Debug, Default, Deserialize)]
pub struct CombineSection {
    /// Run mode (`fdr` or `unfiltered`).
    pub mode: Option<String>,

    /// Q-value threshold.
    pub q_threshold: Option<QSetting>,

    /// Input field delimiter.
    pub delimiter: Option<String>,

    /// Store backend (`memory` or `sqlite`).
    pub store: Option<String>,

    /// SQLite database file.
    pub database: Option<PathBuf>,

    /// Output file.
    pub output: Option<PathBuf>,

    /// Keep decoy rows.
    pub keep_decoys: Option<bool>,

    /// Decoy column value marking a decoy.
    pub decoy_sentinel: Option<String>,

    /// netMHC rank threshold for the filtered allele.
    pub binding_rank_threshold: Option<f64>,

    /// File extension searched by `discover`.
    pub extension: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CombineError::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CombineError::Config(format!("failed to parse TOML configuration: {}", e)).into())
    }
}
