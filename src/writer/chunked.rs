//! Generic chunked writer.
//!
//! `ChunkedWriter` owns the chunk and offset bookkeeping; the frame encoder
//! decides how each chunk is encoded and terminated.
//!
//! ## Stream Stack
//!
//! ```text
//! record -> Frame (encoder member) -> CountingWriter -> BufWriter -> File
//! ```
//!
//! The file is truncated before the counting wrapper is created, so byte
//! offsets are measured from a known-zero length. A chunk's `byte_length` is
//! read from the counter only after its frame has been finished.

use super::{FileNames, RecordWriter};
use crate::config::Options;
use crate::counting::CountingWriter;
use crate::error::{Error, Result};
use crate::frame::{FrameEncoder, GzipFrames, PlainFrames};
use crate::index::{Chunk, ChunkIndex};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "lz4-compression")]
use crate::frame::Lz4Frames;
#[cfg(feature = "snappy")]
use crate::frame::SnappyFrames;

/// Gzip writer: one gzip member per chunk, data file extension `.gz`.
pub type ChunkedCompressedWriter = ChunkedWriter<GzipFrames>;

/// Uncompressed writer, data file extension `.log`.
pub type ChunkedPlainWriter = ChunkedWriter<PlainFrames>;

/// Snappy framing-format writer, data file extension `.sz`.
#[cfg(feature = "snappy")]
pub type ChunkedSnappyWriter = ChunkedWriter<SnappyFrames>;

/// LZ4 frame writer, data file extension `.lz4`.
#[cfg(feature = "lz4-compression")]
pub type ChunkedLz4Writer = ChunkedWriter<Lz4Frames>;

type Sink = CountingWriter<BufWriter<File>>;

enum Stream<F> {
    /// Accepting writes into the current chunk's frame.
    Open(F),
    /// No longer accepting writes.
    Shut(Shut),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shut {
    /// Closed or deleted.
    Closed,
    /// A write or frame termination failed; file contents are undefined.
    Poisoned,
}

impl Shut {
    fn error(self) -> Error {
        match self {
            Shut::Closed => Error::invalid_state("writer is closed"),
            Shut::Poisoned => Error::invalid_state("writer is unusable after a failed write"),
        }
    }
}

/// Chunked record writer parameterized over its frame encoder.
pub struct ChunkedWriter<E: FrameEncoder> {
    names: FileNames,
    options: Options,
    encoder: E,
    /// Never empty; the last element is the current chunk.
    chunks: Vec<Chunk>,
    stream: Stream<E::Frame<Sink>>,
}

impl<E: FrameEncoder> ChunkedWriter<E> {
    /// Creates a writer with the default chunk threshold.
    ///
    /// The data file `<dir>/<base>-<offset:012>.<ext>` is created or truncated.
    pub fn new(
        filename_base: impl Into<String>,
        dir: impl AsRef<Path>,
        first_record_offset: u64,
    ) -> Result<Self> {
        Self::with_options(filename_base, dir, first_record_offset, Options::default())
    }

    /// Creates a writer with an explicit chunk threshold.
    pub fn with_threshold(
        filename_base: impl Into<String>,
        dir: impl AsRef<Path>,
        first_record_offset: u64,
        chunk_threshold: u64,
    ) -> Result<Self> {
        let options = Options::default().chunk_threshold(chunk_threshold);
        Self::with_options(filename_base, dir, first_record_offset, options)
    }

    /// Creates a writer from full options.
    pub fn with_options(
        filename_base: impl Into<String>,
        dir: impl AsRef<Path>,
        first_record_offset: u64,
        options: Options,
    ) -> Result<Self> {
        options.validate()?;

        let dir = dir.as_ref();
        let names = FileNames::new(filename_base, dir, first_record_offset, E::EXTENSION);
        let path = names.data_file_path();
        log::info!("Initializing {} writer at {:?}", E::NAME, path);

        if options.create_dir_if_missing {
            fs::create_dir_all(dir).map_err(|e| Error::file_system(dir, e))?;
        }

        // Truncate explicitly so offsets start from a known-zero length.
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::file_system(&path, e))?;
        file.set_len(0).map_err(|e| Error::file_system(&path, e))?;

        let sink = CountingWriter::new(BufWriter::new(file));
        let encoder = E::from_options(&options);
        let frame = encoder.begin(sink)?;

        Ok(Self {
            names,
            options,
            encoder,
            chunks: vec![Chunk::new(first_record_offset, 0)],
            stream: Stream::Open(frame),
        })
    }

    /// All chunks so far. The last one is still open until close.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Snapshot of the index that close would write.
    pub fn index(&self) -> ChunkIndex {
        ChunkIndex::new(self.chunks.clone())
    }

    /// Options the writer was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Names of the files this writer produces.
    pub fn file_names(&self) -> &FileNames {
        &self.names
    }

    /// Returns true once close or delete has completed.
    pub fn is_closed(&self) -> bool {
        matches!(self.stream, Stream::Shut(Shut::Closed))
    }

    fn current_chunk(&self) -> &Chunk {
        // chunks is never empty
        &self.chunks[self.chunks.len() - 1]
    }

    fn current_chunk_mut(&mut self) -> &mut Chunk {
        let last = self.chunks.len() - 1;
        &mut self.chunks[last]
    }

    /// Takes the open frame, leaving the stream poisoned until it is put back.
    fn take_frame(&mut self) -> Result<E::Frame<Sink>> {
        match std::mem::replace(&mut self.stream, Stream::Shut(Shut::Poisoned)) {
            Stream::Open(frame) => Ok(frame),
            Stream::Shut(shut) => {
                self.stream = Stream::Shut(shut);
                Err(shut.error())
            }
        }
    }

    /// Terminates the current chunk's frame and records its byte length.
    fn finish_chunk(&mut self) -> Result<Sink> {
        let frame = self.take_frame()?;
        let sink = self.encoder.finish(frame)?;

        let bytes_written = sink.bytes_written();
        let ch = self.current_chunk_mut();
        ch.byte_length = bytes_written - ch.byte_offset;
        Ok(sink)
    }

    fn roll_chunk(&mut self) -> Result<()> {
        let sink = self.finish_chunk()?;
        let next = self.current_chunk().successor();

        log::debug!(
            "Chunk {} of {:?} finished: {} records, {} bytes ({} uncompressed)",
            self.chunks.len() - 1,
            self.names.data_file_name(),
            self.current_chunk().num_records,
            self.current_chunk().byte_length,
            self.current_chunk().raw_bytes
        );

        self.stream = Stream::Open(self.encoder.begin(sink)?);
        self.chunks.push(next);
        Ok(())
    }
}

impl<E: FrameEncoder> RecordWriter for ChunkedWriter<E> {
    fn first_record_offset(&self) -> u64 {
        self.names.first_record_offset()
    }

    fn data_file_name(&self) -> String {
        self.names.data_file_name()
    }

    fn index_file_name(&self) -> String {
        self.names.index_file_name()
    }

    fn data_file_path(&self) -> PathBuf {
        self.names.data_file_path()
    }

    fn index_file_path(&self) -> PathBuf {
        self.names.index_file_path()
    }

    fn write(&mut self, record: &str) -> Result<()> {
        if let Stream::Shut(shut) = self.stream {
            return Err(shut.error());
        }

        let needs_terminator = !record.ends_with('\n');
        let raw_bytes = record.len() as u64 + u64::from(needs_terminator);

        // Soft cap: the record that would cross the threshold starts the next
        // chunk, even when the current one is still empty.
        if self.current_chunk().raw_bytes + raw_bytes > self.options.chunk_threshold {
            self.roll_chunk()?;
        }

        let result = match &mut self.stream {
            Stream::Open(frame) => write_record(frame, record, needs_terminator),
            Stream::Shut(shut) => return Err(shut.error()),
        };
        if let Err(e) = result {
            self.stream = Stream::Shut(Shut::Poisoned);
            return Err(Error::Io(e));
        }

        let ch = self.current_chunk_mut();
        ch.raw_bytes += raw_bytes;
        ch.num_records += 1;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        // Drop any open frame before unlinking so nothing lands in the file afterwards.
        self.stream = Stream::Shut(Shut::Closed);
        self.names.delete()
    }

    fn close(&mut self) -> Result<()> {
        let sink = self.finish_chunk()?;

        let path = self.names.data_file_path();
        let file = sink.into_inner().into_inner().map_err(|e| Error::Io(e.into_error()))?;
        if self.options.sync_on_close {
            file.sync_all().map_err(|e| Error::file_system(&path, e))?;
        }
        drop(file);
        self.stream = Stream::Shut(Shut::Closed);

        self.index().write_to(self.names.index_file_path(), self.options.sync_on_close)?;

        log::info!(
            "Closed {:?}: {} chunks, {} records, {} bytes uncompressed",
            path,
            self.num_chunks(),
            self.num_records(),
            self.total_uncompressed_size()
        );
        Ok(())
    }

    fn total_uncompressed_size(&self) -> u64 {
        self.chunks.iter().map(|ch| ch.raw_bytes).sum()
    }

    fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    fn num_records(&self) -> u64 {
        self.chunks.iter().map(|ch| ch.num_records).sum()
    }
}

fn write_record<W: Write>(frame: &mut W, record: &str, needs_terminator: bool) -> io::Result<()> {
    frame.write_all(record.as_bytes())?;
    if needs_terminator {
        frame.write_all(b"\n")?;
    }
    Ok(())
}
