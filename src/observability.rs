//! Logging setup.
//!
//! The library only emits through the `log` facade. Applications and tests
//! that want to see planner and executor output call one of the `init_*`
//! functions once. Later calls install nothing and return the first call's
//! outcome.

use crate::error::{Result, StreamError};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// Outcome of the first install attempt, reported again on every later call
static INIT_LOGGER: OnceLock<std::result::Result<(), String>> = OnceLock::new();

fn builder(level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    builder.is_test(false);
    builder.filter_level(level);

    // Just the level and message
    builder.format(|buf, record| {
        writeln!(buf, "[{}] {}", record.level(), record.args())?;
        buf.flush()?;
        Ok(())
    });

    builder
}

fn install(mut builder: env_logger::Builder) -> Result<()> {
    INIT_LOGGER
        .get_or_init(|| builder.try_init().map_err(|err| err.to_string()))
        .clone()
        .map_err(StreamError::Logger)
}

/// Install a stderr logger at `level`
pub fn init_logging(level: LevelFilter) -> Result<()> {
    install(builder(level))
}

/// Install a stderr logger configured from `RUST_LOG`, defaulting to `warn`
pub fn init_logging_from_env() -> Result<()> {
    let mut builder = builder(LevelFilter::Warn);
    builder.parse_default_env();
    install(builder)
}

/// Install a logger appending to `path`
pub fn init_logging_to_file(level: LevelFilter, path: impl AsRef<Path>) -> Result<()> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut builder = builder(level);
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    install(builder)
}
