// src/config.rs
use crate::error::{RankError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the optional local config file.
pub const CONFIG_FILE: &str = "wikirank.toml";

/// Direction of the final ranking sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of propagation rounds to run.
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Damping factor. `None` keeps the undamped sum of contributions.
    #[serde(default)]
    pub damping: Option<f64>,

    /// Redistribute the rank mass of dangling nodes uniformly across the
    /// graph instead of dropping it.
    #[serde(default)]
    pub redistribute_dangling: bool,

    /// Stop early once the largest per-node rank delta falls below this
    /// threshold. `None` always runs the full round count.
    #[serde(default)]
    pub convergence_threshold: Option<f64>,

    /// Direction of the final ranking.
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,

    /// Records per worker partition during a propagation round.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            damping: None,
            redistribute_dangling: false,
            convergence_threshold: None,
            sort_order: default_sort_order(),
            chunk_size: default_chunk_size(),
            verbose: false,
        }
    }
}

fn default_rounds() -> usize {
    8
}
fn default_sort_order() -> SortOrder {
    SortOrder::Descending
}
fn default_chunk_size() -> usize {
    4096
}

impl PipelineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config, merging `wikirank.toml` from the working directory
    /// if one exists.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Creates a config from the given file, falling back to defaults when
    /// the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| RankError::io(e, path))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RankError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is outside its legal range.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(RankError::Config("rounds must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(RankError::Config("chunk_size must be at least 1".into()));
        }
        if let Some(d) = self.damping {
            if !(0.0..=1.0).contains(&d) {
                return Err(RankError::Config(format!(
                    "damping must be within [0, 1], got {d}"
                )));
            }
        }
        if let Some(t) = self.convergence_threshold {
            if !t.is_finite() || t < 0.0 {
                return Err(RankError::Config(format!(
                    "convergence_threshold must be a non-negative number, got {t}"
                )));
            }
        }
        Ok(())
    }
}
