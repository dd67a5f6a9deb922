//! Record writers.
//!
//! A record writer accumulates newline-delimited text records into a local
//! data file made of size-bounded chunks, and on close writes a JSON side
//! index describing where every chunk lives.
//!
//! ## File Names
//!
//! ```text
//! <base>-<first record offset, 12 digits>.<ext>          // data
//! <base>-<first record offset, 12 digits>.index.json     // index
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chunklog::{ChunkedCompressedWriter, RecordWriter};
//!
//! # fn main() -> Result<(), chunklog::Error> {
//! let mut writer = ChunkedCompressedWriter::new("events", "/tmp/out", 1200)?;
//! writer.write("{\"id\":1}")?;
//! writer.write("{\"id\":2}")?;
//! writer.close()?;
//!
//! println!("{:?} + {:?}", writer.data_file_path(), writer.index_file_path());
//! # Ok(())
//! # }
//! ```

pub mod chunked;

pub use chunked::{ChunkedCompressedWriter, ChunkedPlainWriter, ChunkedWriter};

#[cfg(feature = "lz4-compression")]
pub use chunked::ChunkedLz4Writer;
#[cfg(feature = "snappy")]
pub use chunked::ChunkedSnappyWriter;

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension shared by every index file.
pub const INDEX_EXTENSION: &str = "index.json";

/// Capability shared by all writer variants.
///
/// Writers are single-threaded: callers must not interleave `write`,
/// `close` and `delete` on one instance from several threads.
pub trait RecordWriter {
    /// Logical offset of the first record in this file.
    fn first_record_offset(&self) -> u64;

    /// File name of the data file.
    fn data_file_name(&self) -> String;

    /// File name of the index file.
    fn index_file_name(&self) -> String;

    /// Full path of the data file.
    fn data_file_path(&self) -> PathBuf;

    /// Full path of the index file.
    fn index_file_path(&self) -> PathBuf;

    /// Appends one record.
    ///
    /// A `\n` terminator is appended unless the record already ends with one.
    /// Returns [`Error::InvalidState`] once the writer is closed or unusable.
    fn write(&mut self, record: &str) -> Result<()>;

    /// Removes the data and index files. Missing files are not an error.
    ///
    /// Any open stream is discarded first; the writer cannot be used afterwards.
    fn delete(&mut self) -> Result<()>;

    /// Finalizes the last chunk, closes the data file and writes the index.
    ///
    /// May be called once.
    fn close(&mut self) -> Result<()>;

    /// Sum of uncompressed record bytes, terminators included.
    fn total_uncompressed_size(&self) -> u64;

    /// Number of chunks, including the current one.
    fn num_chunks(&self) -> usize;

    /// Number of records written.
    fn num_records(&self) -> u64;
}

/// Deterministic file names of one writer's data and index files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNames {
    filename_base: String,
    dir: PathBuf,
    first_record_offset: u64,
    extension: &'static str,
}

impl FileNames {
    /// Creates the names for a data file with the given extension.
    pub fn new(
        filename_base: impl Into<String>,
        dir: impl AsRef<Path>,
        first_record_offset: u64,
        extension: &'static str,
    ) -> Self {
        Self {
            filename_base: filename_base.into(),
            dir: dir.as_ref().to_path_buf(),
            first_record_offset,
            extension,
        }
    }

    /// Destination directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Logical offset of the first record.
    pub fn first_record_offset(&self) -> u64 {
        self.first_record_offset
    }

    /// Data file name: `<base>-<offset:012>.<ext>`.
    pub fn data_file_name(&self) -> String {
        format!("{}-{:012}.{}", self.filename_base, self.first_record_offset, self.extension)
    }

    /// Index file name: `<base>-<offset:012>.index.json`.
    pub fn index_file_name(&self) -> String {
        format!("{}-{:012}.{}", self.filename_base, self.first_record_offset, INDEX_EXTENSION)
    }

    /// Full data file path.
    pub fn data_file_path(&self) -> PathBuf {
        self.dir.join(self.data_file_name())
    }

    /// Full index file path.
    pub fn index_file_path(&self) -> PathBuf {
        self.dir.join(self.index_file_name())
    }

    /// Removes the data and index files if they exist.
    ///
    /// Usable without a writer, e.g. to clean up after a failed construction.
    pub fn delete(&self) -> Result<()> {
        delete_if_exists(&self.data_file_path())?;
        delete_if_exists(&self.index_file_path())
    }
}

fn delete_if_exists(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            log::warn!("Not deleting {:?}: is a directory", path);
            Ok(())
        }
        Ok(_) => match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("Deleted {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::file_system(path, e)),
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::file_system(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        let names = FileNames::new("topic-3", "/data/out", 1200, "gz");
        assert_eq!(names.data_file_name(), "topic-3-000000001200.gz");
        assert_eq!(names.index_file_name(), "topic-3-000000001200.index.json");
        assert_eq!(names.data_file_path(), PathBuf::from("/data/out/topic-3-000000001200.gz"));
        assert_eq!(
            names.index_file_path(),
            PathBuf::from("/data/out/topic-3-000000001200.index.json")
        );
    }

    #[test]
    fn test_file_names_wide_offset() {
        let names = FileNames::new("t", "/d", 1_234_567_890_123, "log");
        assert_eq!(names.data_file_name(), "t-1234567890123.log");
    }

    #[test]
    fn test_delete_missing_files() {
        let dir = TempDir::new().unwrap();
        let names = FileNames::new("never", dir.path(), 0, "gz");
        assert!(names.delete().is_ok());
        assert!(names.delete().is_ok());
    }

    #[test]
    fn test_delete_existing_files() {
        let dir = TempDir::new().unwrap();
        let names = FileNames::new("t", dir.path(), 7, "log");
        fs::write(names.data_file_path(), b"x\n").unwrap();
        fs::write(names.index_file_path(), b"{}").unwrap();

        names.delete().unwrap();
        assert!(!names.data_file_path().exists());
        assert!(!names.index_file_path().exists());
    }

    #[test]
    fn test_delete_skips_directories() {
        let dir = TempDir::new().unwrap();
        let names = FileNames::new("t", dir.path(), 0, "log");
        fs::create_dir(names.data_file_path()).unwrap();

        names.delete().unwrap();
        assert!(names.data_file_path().is_dir());
    }
}
