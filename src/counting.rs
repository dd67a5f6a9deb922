//! Byte-counting writer.
//!
//! Chunk byte offsets are measured at this layer: every byte an encoder
//! hands down is counted before it reaches the file buffer, so after a
//! frame is finished the count equals the final file position.

use std::io::{self, Write};

/// A `Write` wrapper that counts the bytes accepted by the inner writer.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    /// Wraps `inner` with a zero count.
    pub fn new(inner: W) -> Self {
        Self { inner, bytes_written: 0 }
    }

    /// Total bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the inner writer.
    ///
    /// Bytes written directly through it are not counted.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts at most `max` bytes per call.
    struct ShortWriter {
        data: Vec<u8>,
        max: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.max);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_counts_bytes() {
        let mut w = CountingWriter::new(Vec::new());
        assert_eq!(w.bytes_written(), 0);

        w.write_all(b"hello").unwrap();
        w.write_all(b" world").unwrap();
        assert_eq!(w.bytes_written(), 11);
        assert_eq!(w.into_inner(), b"hello world".to_vec());
    }

    #[test]
    fn test_counts_partial_writes() {
        let mut w = CountingWriter::new(ShortWriter { data: Vec::new(), max: 3 });
        w.write_all(b"0123456789").unwrap();
        assert_eq!(w.bytes_written(), 10);
        assert_eq!(w.get_ref().data, b"0123456789".to_vec());
    }
}
