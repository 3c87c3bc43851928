//! Construction settings for trees, rings and their diagnostic dumps.
//!
//! [`TreeConfig`] is the validated form; callers assemble it through
//! [`TreeConfigBuilder`], whose public fields start from safe defaults, or load
//! it from JSON.
//!
//! | Field | Default |
//! |-------|---------|
//! | `algorithm` | [`HashAlgorithm::Sha256`] |
//! | `workers` | `None` (host parallelism) |
//! | `visual.max_depth` | `None` (unbounded) |
//! | `visual.prefix_len` | `8` hex characters |
//! | `visual.color` | `false` |
//! | `visual.dark_mode` | `true` |

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::{HashAlgorithm, DIGEST_SIZE};
use crate::visual::VisualOptions;

/// Validation failures for [`TreeConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A worker pool needs at least one worker.
    ZeroWorkers,
    /// Digest prefixes must be between 1 and 64 hex characters.
    InvalidPrefixLength { got: usize },
    /// The JSON document could not be parsed.
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWorkers => write!(f, "worker count must be at least 1"),
            ConfigError::InvalidPrefixLength { got } => write!(
                f,
                "digest prefix length must be within 1..={}, got {}",
                DIGEST_SIZE * 2,
                got
            ),
            ConfigError::Json(reason) => write!(f, "malformed configuration json: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeConfig {
    algorithm: HashAlgorithm,
    workers: Option<usize>,
    visual: VisualOptions,
}

impl TreeConfig {
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::new()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    pub fn visual(&self) -> &VisualOptions {
        &self.visual
    }

    /// Parses and validates a JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let builder: TreeConfigBuilder =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        builder.build()
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            workers: None,
            visual: VisualOptions::default(),
        }
    }
}

/// Builder used to assemble a [`TreeConfig`] with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfigBuilder {
    pub algorithm: HashAlgorithm,
    pub workers: Option<usize>,
    pub visual: VisualOptions,
}

impl TreeConfigBuilder {
    /// Returns a builder initialised with the defaults listed above.
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            workers: None,
            visual: VisualOptions::default(),
        }
    }

    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn visual(mut self, visual: VisualOptions) -> Self {
        self.visual = visual;
        self
    }

    /// Validates the settings.
    pub fn build(self) -> Result<TreeConfig, ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        let prefix_len = self.visual.prefix_len;
        if prefix_len == 0 || prefix_len > DIGEST_SIZE * 2 {
            return Err(ConfigError::InvalidPrefixLength { got: prefix_len });
        }
        Ok(TreeConfig {
            algorithm: self.algorithm,
            workers: self.workers,
            visual: self.visual,
        })
    }
}

impl Default for TreeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
