//! Configuration options for chunked record writers.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Default maximum uncompressed bytes per chunk (64MB).
pub const DEFAULT_CHUNK_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Default compression level for level-aware encoders.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest accepted compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Configuration options for creating a writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Maximum uncompressed bytes per chunk before a rollover.
    ///
    /// This is a soft cap: a chunk never splits a record, so the record that
    /// would cross the threshold starts the next chunk instead.
    /// Default: 64MB
    pub chunk_threshold: u64,

    /// Compression level passed to the frame encoder (0-9).
    /// Ignored by encoders without levels.
    /// Default: 6
    pub compression_level: u32,

    /// Create the destination directory if it doesn't exist.
    /// Default: false
    pub create_dir_if_missing: bool,

    /// Fsync the data and index files on close.
    /// Default: false
    pub sync_on_close: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            create_dir_if_missing: false,
            sync_on_close: false,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk threshold in uncompressed bytes.
    pub fn chunk_threshold(mut self, bytes: u64) -> Self {
        self.chunk_threshold = bytes;
        self
    }

    /// Sets the compression level.
    pub fn compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets whether to create the destination directory.
    pub fn create_dir_if_missing(mut self, value: bool) -> Self {
        self.create_dir_if_missing = value;
        self
    }

    /// Sets whether to fsync files on close.
    pub fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_threshold == 0 {
            return Err(Error::invalid_argument("chunk_threshold must be > 0"));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(Error::invalid_argument(format!(
                "compression_level must be between 0 and {}",
                MAX_COMPRESSION_LEVEL
            )));
        }
        Ok(())
    }

    /// Parses options from a string key-value map.
    ///
    /// Recognized keys are `chunk.threshold`, `compression.level`,
    /// `dir.create` and `sync.on.close`. Other keys are ignored so the
    /// caller can pass its whole connector configuration.
    pub fn from_config_map(config: &HashMap<String, String>) -> Result<Self> {
        let mut options = Options::default();

        if let Some(value) = config.get("chunk.threshold") {
            options.chunk_threshold = parse_value(value, "chunk.threshold")?;
        }
        if let Some(value) = config.get("compression.level") {
            options.compression_level = parse_value(value, "compression.level")?;
        }
        if let Some(value) = config.get("dir.create") {
            options.create_dir_if_missing = parse_value(value, "dir.create")?;
        }
        if let Some(value) = config.get("sync.on.close") {
            options.sync_on_close = parse_value(value, "sync.on.close")?;
        }

        options.validate()?;
        Ok(options)
    }
}

fn parse_value<T>(value: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| Error::invalid_argument(format!("invalid {}: {}", key, e)))
}
