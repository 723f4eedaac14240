//! Execution configuration for pipelines.
//!
//! A `StreamConfig` is built once (usually `Default`, or parsed from JSON at an
//! application boundary) and shared read-only as an `Arc<StreamConfig>` by every
//! pipeline derived from the one it was attached to.

use crate::error::{Result, StreamError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Knobs consulted by the planner and executor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct StreamConfig {
    /// Merge adjacent stateless stages into a single pass.
    ///
    /// Turning this off gives every stage its own pass. Results are identical
    /// either way; only the number of intermediate buffers changes.
    #[serde(default = "default_true")]
    pub fusion: bool,

    /// Use a stable sort for `sort`. When false, `sort_unstable_by` is used.
    #[serde(default = "default_true")]
    pub stable_sort: bool,

    /// Record per-run counters in `ExecutionStats`.
    #[serde(default)]
    pub collect_stats: bool,

    /// Log the rendered plan at debug level on every terminal call.
    #[serde(default)]
    pub log_plans: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            fusion: true,
            stable_sort: true,
            collect_stats: false,
            log_plans: false,
        }
    }
}

impl StreamConfig {
    /// Parse a configuration from a JSON document. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(StreamError::Config("empty configuration document".to_string()));
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Wrap in an `Arc` for sharing between pipelines.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert!(config.fusion);
        assert!(config.stable_sort);
        assert!(!config.collect_stats);
        assert!(!config.log_plans);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = StreamConfig::from_json(r#"{ "fusion": false }"#).unwrap();
        assert!(!config.fusion);
        assert!(config.stable_sort);
        assert!(!config.collect_stats);
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = StreamConfig::from_json("   ").unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = StreamConfig::from_json(r#"{ "parallelism": 4 }"#).unwrap_err();
        assert!(matches!(err, StreamError::Json(_)));
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = StreamConfig {
            fusion: false,
            stable_sort: false,
            collect_stats: true,
            log_plans: true,
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(StreamConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = StreamConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, StreamError::Io(_)));
    }
}
