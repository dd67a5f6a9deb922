//! Writer registry.
//!
//! Maps a configuration key to a factory function so callers can select a
//! writer variant by name. The registry is an ordinary value: build one at
//! startup and hand it to whatever component creates writers.
//!
//! ```rust,no_run
//! use chunklog::{RecordWriter, WriterRegistry};
//!
//! # fn main() -> Result<(), chunklog::Error> {
//! let registry = WriterRegistry::with_defaults();
//! let mut writer = registry.create("block-gzip", "events", "/tmp/out", 0, 64 * 1024 * 1024)?;
//! writer.write("hello")?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

use crate::config::Options;
use crate::error::{Error, Result};
use crate::frame::{FrameEncoder, GzipFrames, PlainFrames};
use crate::writer::{ChunkedWriter, RecordWriter};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

#[cfg(feature = "lz4-compression")]
use crate::frame::Lz4Frames;
#[cfg(feature = "snappy")]
use crate::frame::SnappyFrames;

/// Key of the uncompressed writer.
pub const PLAINTEXT: &str = PlainFrames::NAME;

/// Key of the gzip writer.
pub const BLOCK_GZIP: &str = GzipFrames::NAME;

/// Key of the snappy writer.
#[cfg(feature = "snappy")]
pub const BLOCK_SNAPPY: &str = SnappyFrames::NAME;

/// Key of the LZ4 writer.
#[cfg(feature = "lz4-compression")]
pub const BLOCK_LZ4: &str = Lz4Frames::NAME;

/// Constructs a writer from `(filename_base, dir, first_record_offset, options)`.
pub type WriterFactory =
    Box<dyn Fn(&str, &Path, u64, &Options) -> Result<Box<dyn RecordWriter>> + Send + Sync>;

/// Name to factory lookup for writer variants.
#[derive(Default)]
pub struct WriterRegistry {
    factories: HashMap<String, WriterFactory>,
}

impl WriterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in writer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_chunked::<PlainFrames>();
        registry.register_chunked::<GzipFrames>();
        #[cfg(feature = "snappy")]
        registry.register_chunked::<SnappyFrames>();
        #[cfg(feature = "lz4-compression")]
        registry.register_chunked::<Lz4Frames>();
        registry
    }

    /// Registers `factory` under `key`, replacing any earlier registration.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&str, &Path, u64, &Options) -> Result<Box<dyn RecordWriter>> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.factories.insert(key.clone(), Box::new(factory)).is_some() {
            log::debug!("Replaced writer registration for {:?}", key);
        }
    }

    /// Registers the chunked writer for encoder `E` under its own name.
    pub fn register_chunked<E>(&mut self)
    where
        E: FrameEncoder + 'static,
    {
        self.register(E::NAME, |base, dir, offset, options| {
            let writer = ChunkedWriter::<E>::with_options(base, dir, offset, options.clone())?;
            Ok(Box::new(writer) as Box<dyn RecordWriter>)
        });
    }

    /// Returns true if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Creates a writer with default options and the given chunk threshold.
    pub fn create(
        &self,
        key: &str,
        filename_base: &str,
        dir: impl AsRef<Path>,
        first_record_offset: u64,
        chunk_threshold: u64,
    ) -> Result<Box<dyn RecordWriter>> {
        let options = Options::default().chunk_threshold(chunk_threshold);
        self.create_with_options(key, filename_base, dir, first_record_offset, &options)
    }

    /// Creates a writer from full options.
    ///
    /// Fails with [`Error::Instantiation`] if `key` is unknown or the writer
    /// cannot be constructed.
    pub fn create_with_options(
        &self,
        key: &str,
        filename_base: &str,
        dir: impl AsRef<Path>,
        first_record_offset: u64,
        options: &Options,
    ) -> Result<Box<dyn RecordWriter>> {
        let factory = self.factories.get(key).ok_or_else(|| {
            log::error!("No writer registered for {:?}", key);
            Error::instantiation(format!("unknown writer {:?}", key))
        })?;

        factory(filename_base, dir.as_ref(), first_record_offset, options).map_err(|e| {
            log::error!("Error instantiating writer {:?}: {}", key, e);
            Error::instantiation(format!("failed to create writer {:?}: {}", key, e))
        })
    }
}

impl fmt::Debug for WriterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterRegistry").field("keys", &self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChunkIndex;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_registered() {
        let registry = WriterRegistry::with_defaults();
        assert!(registry.contains(PLAINTEXT));
        assert!(registry.contains(BLOCK_GZIP));
        assert!(!registry.contains("parquet"));
        assert!(WriterRegistry::new().keys().is_empty());
    }

    #[test]
    fn test_create_by_key() {
        let dir = TempDir::new().unwrap();
        let registry = WriterRegistry::with_defaults();

        let gz = registry.create(BLOCK_GZIP, "t", dir.path(), 42, 1024).unwrap();
        assert_eq!(gz.data_file_name(), "t-000000000042.gz");

        let mut plain = registry.create(PLAINTEXT, "t", dir.path(), 42, 4).unwrap();
        assert_eq!(plain.data_file_name(), "t-000000000042.log");
        plain.write("a").unwrap();
        plain.write("b").unwrap();
        plain.write("c").unwrap();
        assert_eq!(plain.num_chunks(), 2);
        plain.close().unwrap();

        let index = ChunkIndex::read_from(plain.index_file_path()).unwrap();
        assert_eq!(index.chunks[1].first_offset, 44);
    }

    #[test]
    fn test_unknown_key() {
        let dir = TempDir::new().unwrap();
        let registry = WriterRegistry::with_defaults();
        let err = registry.create("block-bzip2", "t", dir.path(), 0, 1024).err().unwrap();
        assert!(matches!(err, Error::Instantiation(_)));
    }

    #[test]
    fn test_construction_failure_is_instantiation_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let registry = WriterRegistry::with_defaults();
        let err = registry.create(BLOCK_GZIP, "t", &missing, 0, 1024).err().unwrap();
        assert!(matches!(err, Error::Instantiation(_)));
        assert!(err.to_string().contains("block-gzip"));
    }

    #[test]
    fn test_last_registration_wins() {
        let dir = TempDir::new().unwrap();
        let mut registry = WriterRegistry::with_defaults();
        registry.register("custom", |_, _, _, _| Err(Error::invalid_argument("first")));
        registry.register("custom", |base, dir, offset, options| {
            let writer =
                ChunkedWriter::<PlainFrames>::with_options(base, dir, offset, options.clone())?;
            Ok(Box::new(writer) as Box<dyn RecordWriter>)
        });

        let writer = registry.create("custom", "t", dir.path(), 0, 1024).unwrap();
        assert_eq!(writer.data_file_name(), "t-000000000000.log");
        assert_eq!(registry.keys().iter().filter(|k| **k == "custom").count(), 1);
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn test_snappy_registered() {
        let dir = TempDir::new().unwrap();
        let registry = WriterRegistry::with_defaults();
        let writer = registry.create(BLOCK_SNAPPY, "t", dir.path(), 0, 1024).unwrap();
        assert_eq!(writer.data_file_name(), "t-000000000000.sz");
    }
}
