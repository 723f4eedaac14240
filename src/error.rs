//! Unified error type for streamfuse.
//!
//! The execution engine itself never fails: element types are checked by the
//! compiler and every empty-buffer edge has a defined result. Errors only come
//! from the ambient surfaces (configuration loading, logger installation).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    /// A configuration value was rejected after parsing.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The global logger could not be installed.
    #[error("Logger initialization failed: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, StreamError>;
