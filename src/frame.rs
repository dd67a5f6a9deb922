//! Frame encoders.
//!
//! A frame (or member) is one independently terminated unit of a streaming
//! format. Every chunk of a data file is written as exactly one frame, and
//! all frames share a single underlying sink. For the compressed formats the
//! concatenation of frames is itself a valid stream, so the whole file
//! decodes with a standard decoder while each chunk's byte range also
//! decodes on its own.
//!
//! This is why frames are *finished* at every chunk boundary, not merely
//! flushed: a flushed gzip member has no trailer and cannot be decoded
//! independently.

use crate::config::Options;
use crate::error::{Error, Result};
use std::io::Write;

/// Strategy for opening and terminating the frame of one chunk.
pub trait FrameEncoder {
    /// The encoder stack that wraps the sink while a chunk is open.
    type Frame<W: Write>: Write;

    /// Short name used in log messages.
    const NAME: &'static str;

    /// Data file extension, without the leading dot.
    const EXTENSION: &'static str;

    /// Builds the encoder from writer options.
    fn from_options(options: &Options) -> Self
    where
        Self: Sized;

    /// Opens a new frame on top of `sink`.
    fn begin<W: Write>(&self, sink: W) -> Result<Self::Frame<W>>;

    /// Terminates `frame` so every byte of it has reached the sink, and
    /// hands the sink back.
    fn finish<W: Write>(&self, frame: Self::Frame<W>) -> Result<W>;
}

/// Uncompressed frames. Finishing a frame is a plain flush.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFrames;

impl FrameEncoder for PlainFrames {
    type Frame<W: Write> = W;

    const NAME: &'static str = "plaintext";
    const EXTENSION: &'static str = "log";

    fn from_options(_options: &Options) -> Self {
        PlainFrames
    }

    fn begin<W: Write>(&self, sink: W) -> Result<Self::Frame<W>> {
        Ok(sink)
    }

    fn finish<W: Write>(&self, mut frame: Self::Frame<W>) -> Result<W> {
        frame.flush()?;
        Ok(frame)
    }
}

/// Gzip frames: one gzip member per chunk (RFC 1952 multi-member stream).
#[derive(Debug, Clone, Copy)]
pub struct GzipFrames {
    level: flate2::Compression,
}

impl GzipFrames {
    /// Creates a gzip encoder with the given level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self { level: flate2::Compression::new(level) }
    }
}

impl Default for GzipFrames {
    fn default() -> Self {
        Self { level: flate2::Compression::default() }
    }
}

impl FrameEncoder for GzipFrames {
    type Frame<W: Write> = flate2::write::GzEncoder<W>;

    const NAME: &'static str = "block-gzip";
    const EXTENSION: &'static str = "gz";

    fn from_options(options: &Options) -> Self {
        Self::with_level(options.compression_level)
    }

    fn begin<W: Write>(&self, sink: W) -> Result<Self::Frame<W>> {
        Ok(flate2::write::GzEncoder::new(sink, self.level))
    }

    fn finish<W: Write>(&self, frame: Self::Frame<W>) -> Result<W> {
        frame
            .finish()
            .map_err(|e| Error::encoding(format!("failed to finish gzip member: {}", e)))
    }
}

/// Snappy frames: one framing-format stream per chunk.
///
/// The stream identifier is repeated at the start of each chunk, which the
/// framing format allows, so concatenated chunks still form one stream.
#[cfg(feature = "snappy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SnappyFrames;

#[cfg(feature = "snappy")]
impl FrameEncoder for SnappyFrames {
    type Frame<W: Write> = snap::write::FrameEncoder<W>;

    const NAME: &'static str = "block-snappy";
    const EXTENSION: &'static str = "sz";

    fn from_options(_options: &Options) -> Self {
        SnappyFrames
    }

    fn begin<W: Write>(&self, sink: W) -> Result<Self::Frame<W>> {
        Ok(snap::write::FrameEncoder::new(sink))
    }

    fn finish<W: Write>(&self, frame: Self::Frame<W>) -> Result<W> {
        frame
            .into_inner()
            .map_err(|e| Error::encoding(format!("failed to finish snappy stream: {}", e.error())))
    }
}

/// LZ4 frames: one LZ4 frame per chunk.
#[cfg(feature = "lz4-compression")]
#[derive(Debug, Clone, Copy)]
pub struct Lz4Frames {
    level: u32,
}

#[cfg(feature = "lz4-compression")]
impl FrameEncoder for Lz4Frames {
    type Frame<W: Write> = lz4::Encoder<W>;

    const NAME: &'static str = "block-lz4";
    const EXTENSION: &'static str = "lz4";

    fn from_options(options: &Options) -> Self {
        Self { level: options.compression_level }
    }

    fn begin<W: Write>(&self, sink: W) -> Result<Self::Frame<W>> {
        lz4::EncoderBuilder::new()
            .level(self.level)
            .build(sink)
            .map_err(|e| Error::encoding(format!("failed to start lz4 frame: {}", e)))
    }

    fn finish<W: Write>(&self, frame: Self::Frame<W>) -> Result<W> {
        let (sink, result) = frame.finish();
        result.map_err(|e| Error::encoding(format!("failed to finish lz4 frame: {}", e)))?;
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::{GzDecoder, MultiGzDecoder};
    use std::io::Read;

    fn encode<E: FrameEncoder>(encoder: &E, members: &[&[u8]]) -> (Vec<u8>, Vec<usize>) {
        let mut sink = Vec::new();
        let mut boundaries = Vec::new();
        for data in members {
            let mut frame = encoder.begin(sink).unwrap();
            frame.write_all(data).unwrap();
            sink = encoder.finish(frame).unwrap();
            boundaries.push(sink.len());
        }
        (sink, boundaries)
    }

    #[test]
    fn test_plain_frames_pass_through() {
        let (out, boundaries) = encode(&PlainFrames, &[b"ab\n", b"cd\n"]);
        assert_eq!(out, b"ab\ncd\n".to_vec());
        assert_eq!(boundaries, vec![3, 6]);
    }

    #[test]
    fn test_gzip_members_concatenate() {
        let (out, boundaries) = encode(&GzipFrames::default(), &[b"first\n", b"second\n"]);

        let mut whole = String::new();
        MultiGzDecoder::new(&out[..]).read_to_string(&mut whole).unwrap();
        assert_eq!(whole, "first\nsecond\n");

        let mut tail = String::new();
        GzDecoder::new(&out[boundaries[0]..]).read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "second\n");
    }

    #[test]
    fn test_gzip_empty_member_is_valid() {
        let (out, _) = encode(&GzipFrames::with_level(1), &[b""]);
        assert!(!out.is_empty());

        let mut decoded = Vec::new();
        GzDecoder::new(&out[..]).read_to_end(&mut decoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(PlainFrames::EXTENSION, "log");
        assert_eq!(GzipFrames::EXTENSION, "gz");
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn test_snappy_members_decode_independently() {
        let (out, boundaries) = encode(&SnappyFrames, &[b"first\n", b"second\n"]);

        let mut head = String::new();
        snap::read::FrameDecoder::new(&out[..boundaries[0]])
            .read_to_string(&mut head)
            .unwrap();
        assert_eq!(head, "first\n");

        let mut tail = String::new();
        snap::read::FrameDecoder::new(&out[boundaries[0]..])
            .read_to_string(&mut tail)
            .unwrap();
        assert_eq!(tail, "second\n");
    }

    #[cfg(feature = "lz4-compression")]
    #[test]
    fn test_lz4_member_decodes() {
        let (out, boundaries) = encode(&Lz4Frames { level: 4 }, &[b"first\n", b"second\n"]);

        let mut tail = String::new();
        lz4::Decoder::new(&out[boundaries[0]..]).unwrap().read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "second\n");
    }
}
