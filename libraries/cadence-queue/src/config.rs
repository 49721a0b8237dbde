/// Queue configuration
use crate::error::{QueueError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Maximum number of playables, unbounded if unset
    #[serde(default)]
    pub max_size: Option<usize>,

    /// How long presentation waits for lazily loaded metadata
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    /// Previous/next tracks shown around the current one
    #[serde(default = "default_lookaround")]
    pub lookaround: usize,

    /// Display text longer than this is truncated
    #[serde(default = "default_display_max_len")]
    pub display_max_len: usize,

    #[serde(default)]
    pub default_thumbnail_url: Option<String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            metadata_timeout_ms: default_metadata_timeout_ms(),
            lookaround: default_lookaround(),
            display_max_len: default_display_max_len(),
            default_thumbnail_url: None,
        }
    }
}

impl QueueConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables are prefixed with `CADENCE_`, e.g.
    /// `CADENCE_MAX_SIZE=500`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        // single underscores stay inside field names
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| QueueError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| QueueError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_size == Some(0) {
            return Err(QueueError::Config(
                "max_size must be at least 1 (unset it for an unbounded queue)".to_string(),
            ));
        }

        // room for at least one character plus the truncation marker
        if self.display_max_len <= TRUNCATION_MARKER.len() {
            return Err(QueueError::Config(format!(
                "display_max_len must be greater than {}",
                TRUNCATION_MARKER.len()
            )));
        }

        Ok(())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }
}

/// Suffix appended to truncated display text
pub const TRUNCATION_MARKER: &str = "[...]";

// Default values
fn default_metadata_timeout_ms() -> u64 {
    100
}

fn default_lookaround() -> usize {
    5
}

fn default_display_max_len() -> usize {
    100
}
