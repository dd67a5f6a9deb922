//! # chunklog - Chunked, Seekable Record-Log Writer
//!
//! chunklog writes a stream of newline-delimited text records into a local
//! data file split into size-bounded chunks, and emits a JSON side index
//! describing the byte and record boundaries of every chunk.
//!
//! A reader holding the index can fetch one chunk's byte range (for example
//! with an HTTP range request against object storage) and decode it on its
//! own. With a compressed writer each chunk is an independently terminated
//! member, so the whole file also decodes as a single stream with any
//! standard decoder.
//!
//! ## Architecture
//!
//! - **RecordWriter**: capability shared by all writer variants
//! - **ChunkedWriter**: chunk rollover and offset bookkeeping, generic over a frame encoder
//! - **FrameEncoder**: how one chunk is encoded and terminated (plain, gzip, snappy, lz4)
//! - **ChunkIndex**: the JSON side index
//! - **WriterRegistry**: selects a writer variant by configuration key
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chunklog::{ChunkIndex, ChunkedCompressedWriter, Options, RecordWriter};
//!
//! # fn main() -> Result<(), chunklog::Error> {
//! let options = Options::default().chunk_threshold(1024 * 1024);
//! let mut writer = ChunkedCompressedWriter::with_options("events", "./out", 0, options)?;
//!
//! for i in 0..10_000 {
//!     writer.write(&format!("{{\"id\":{}}}", i))?;
//! }
//! writer.close()?;
//!
//! let index = ChunkIndex::read_from(writer.index_file_path())?;
//! if let Some(chunk) = index.chunk_for_record(5_000) {
//!     println!("record 5000 lives in bytes {}..{}", chunk.byte_offset, chunk.byte_end());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod counting;
pub mod error;
pub mod frame;
pub mod index;
pub mod registry;
pub mod writer;

// Re-exports
pub use config::{Options, DEFAULT_CHUNK_THRESHOLD};
pub use error::{Error, Result};
pub use frame::{FrameEncoder, GzipFrames, PlainFrames};
pub use index::{Chunk, ChunkIndex};
pub use registry::{WriterFactory, WriterRegistry};
pub use writer::{
    ChunkedCompressedWriter, ChunkedPlainWriter, ChunkedWriter, FileNames, RecordWriter,
};

#[cfg(feature = "lz4-compression")]
pub use frame::Lz4Frames;
#[cfg(feature = "snappy")]
pub use frame::SnappyFrames;
#[cfg(feature = "lz4-compression")]
pub use writer::ChunkedLz4Writer;
#[cfg(feature = "snappy")]
pub use writer::ChunkedSnappyWriter;
