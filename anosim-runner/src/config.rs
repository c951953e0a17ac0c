//! Serializable run configuration (TOML).
//!
//! ```toml
//! [input]
//! matrix = "d1.txt"
//! labels = "gd.txt"
//!
//! [search]
//! max_permutations = 1000000
//! strategy = "random"
//! seed = 7
//! parallel = true
//! batch_size = 4096
//! threads = 0
//! ```
//!
//! Every `[search]` key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use anosim_core::permutation::{
    PermutationStrategy, DEFAULT_BATCH_SIZE, DEFAULT_MAX_PERMUTATIONS,
};

/// Errors from reading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration of one ANOSIM run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnosimConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Distance matrix file.
    pub matrix: PathBuf,
    /// Group label file.
    pub labels: PathBuf,
}

/// Relabeling order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Lexicographic,
    Random,
}

/// Permutation search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Cap on trials, observed assignment included.
    pub max_permutations: u64,
    pub strategy: StrategyKind,
    /// Seed for the random strategy. Ignored by lexicographic search.
    pub seed: u64,
    /// Evaluate trial batches with rayon.
    pub parallel: bool,
    pub batch_size: usize,
    /// Worker threads for a private pool; 0 uses the global rayon pool.
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_permutations: DEFAULT_MAX_PERMUTATIONS,
            strategy: StrategyKind::Lexicographic,
            seed: 42,
            parallel: true,
            batch_size: DEFAULT_BATCH_SIZE,
            threads: 0,
        }
    }
}

impl SearchConfig {
    pub fn permutation_strategy(&self) -> PermutationStrategy {
        match self.strategy {
            StrategyKind::Lexicographic => PermutationStrategy::Lexicographic,
            StrategyKind::Random => PermutationStrategy::Random { seed: self.seed },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_permutations == 0 {
            return Err(ConfigError::Invalid(
                "search.max_permutations must be at least 1".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "search.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl AnosimConfig {
    pub fn new(matrix: impl Into<PathBuf>, labels: impl Into<PathBuf>) -> Self {
        Self {
            input: InputConfig {
                matrix: matrix.into(),
                labels: labels.into(),
            },
            search: SearchConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnosimConfig = toml::from_str(content)?;
        config.search.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative input paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            config.input.matrix = resolve(base, &config.input.matrix);
            config.input.labels = resolve(base, &config.input.labels);
        }
        Ok(config)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
