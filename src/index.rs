//! Chunk metadata and the JSON side index.
//!
//! ## Index Format
//!
//! ```text
//! {"chunks":[
//!   {"first_record_offset":0,"num_records":3,"byte_offset":0,"byte_length":31,"byte_length_uncompressed":9},
//!   ...
//! ]}
//! ```
//!
//! Chunks are listed in file order and tile the data file: chunk `i+1`
//! starts where chunk `i` ends, both in bytes and in logical record offsets.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// One bounded run of records written as a self-contained encoded unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chunk {
    /// Logical record offset of the first record in the chunk.
    #[serde(rename = "first_record_offset")]
    pub first_offset: u64,
    /// Records written into the chunk.
    pub num_records: u64,
    /// Position in the data file where the chunk's bytes begin.
    pub byte_offset: u64,
    /// Bytes the chunk occupies in the data file.
    ///
    /// Only meaningful once the chunk has been finalized.
    pub byte_length: u64,
    /// Uncompressed size of the records, terminators included.
    #[serde(rename = "byte_length_uncompressed")]
    pub raw_bytes: u64,
}

impl Chunk {
    /// Creates an empty chunk starting at the given record and byte offsets.
    pub fn new(first_offset: u64, byte_offset: u64) -> Self {
        Self { first_offset, byte_offset, ..Default::default() }
    }

    /// Creates the empty chunk that follows `self`.
    ///
    /// `self` must already be finalized.
    pub fn successor(&self) -> Self {
        Chunk::new(self.first_offset + self.num_records, self.byte_offset + self.byte_length)
    }

    /// Byte position just past the chunk.
    pub fn byte_end(&self) -> u64 {
        self.byte_offset + self.byte_length
    }

    /// Record offset just past the chunk.
    pub fn end_offset(&self) -> u64 {
        self.first_offset + self.num_records
    }

    /// Returns true if the logical record `offset` falls within this chunk.
    pub fn contains_record(&self, offset: u64) -> bool {
        offset >= self.first_offset && offset < self.end_offset()
    }
}

/// The side index written next to a data file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkIndex {
    /// Chunks in file order.
    pub chunks: Vec<Chunk>,
}

impl ChunkIndex {
    /// Creates an index from chunks in file order.
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    /// Serializes the index to `path`, replacing any existing file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P, sync: bool) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::file_system(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        if sync {
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    /// Reads an index previously written with [`ChunkIndex::write_to`].
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_system(path, e))?;
        let index = serde_json::from_reader(BufReader::new(file))?;
        Ok(index)
    }

    /// Checks that chunks tile the data file and record offsets are contiguous.
    pub fn validate(&self) -> Result<()> {
        for (i, pair) in self.chunks.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.byte_offset != prev.byte_end() {
                return Err(Error::invalid_state(format!(
                    "chunk {} starts at byte {}, expected {}",
                    i + 1,
                    next.byte_offset,
                    prev.byte_end()
                )));
            }
            if next.first_offset != prev.end_offset() {
                return Err(Error::invalid_state(format!(
                    "chunk {} starts at record {}, expected {}",
                    i + 1,
                    next.first_offset,
                    prev.end_offset()
                )));
            }
        }
        Ok(())
    }

    /// Finds the chunk holding the logical record `offset`.
    pub fn chunk_for_record(&self, offset: u64) -> Option<&Chunk> {
        let idx = self.chunks.partition_point(|ch| ch.end_offset() <= offset);
        self.chunks.get(idx).filter(|ch| ch.contains_record(offset))
    }

    /// Total encoded bytes across all chunks.
    pub fn total_bytes(&self) -> u64 {
        self.chunks.iter().map(|ch| ch.byte_length).sum()
    }

    /// Total records across all chunks.
    pub fn num_records(&self) -> u64 {
        self.chunks.iter().map(|ch| ch.num_records).sum()
    }
}
