//! BZip2 codec implementation.

use std::io::{self, BufRead, Read, Write};

use bzip2::Compression;
use bzip2::bufread::MultiBzDecoder;
use bzip2::write::BzEncoder;

use super::{Decoder, Encoder};
use crate::format::CompressionFilter;

/// BZip2 decoder.
///
/// Concatenated streams (as written by parallel compressors) are decoded as one.
pub struct Bzip2Decoder<R> {
    inner: MultiBzDecoder<R>,
}

impl<R> std::fmt::Debug for Bzip2Decoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Decoder").finish_non_exhaustive()
    }
}

impl<R: BufRead> Bzip2Decoder<R> {
    /// Creates a new BZip2 decoder.
    pub fn new(input: R) -> Self {
        Self {
            inner: MultiBzDecoder::new(input),
        }
    }
}

impl<R: BufRead> Read for Bzip2Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead> Decoder for Bzip2Decoder<R> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Bzip2
    }
}

/// BZip2 encoder options.
#[derive(Debug, Clone)]
pub struct Bzip2EncoderOptions {
    /// Compression level (1-9, default 9).
    pub level: u32,
}

impl Default for Bzip2EncoderOptions {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl Bzip2EncoderOptions {
    /// Creates options with the given compression level.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.clamp(1, 9),
        }
    }
}

/// BZip2 encoder.
pub struct Bzip2Encoder<W: Write> {
    inner: BzEncoder<W>,
}

impl<W: Write> std::fmt::Debug for Bzip2Encoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Encoder").finish_non_exhaustive()
    }
}

impl<W: Write> Bzip2Encoder<W> {
    /// Creates a new BZip2 encoder.
    pub fn new(output: W, options: &Bzip2EncoderOptions) -> Self {
        Self {
            inner: BzEncoder::new(output, Compression::new(options.level)),
        }
    }
}

impl<W: Write> Write for Bzip2Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder<W> for Bzip2Encoder<W> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Bzip2
    }

    fn finish(self: Box<Self>) -> io::Result<W> {
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bzip2_roundtrip() {
        let data = b"Hello, World! This is a test of BZip2 compression.";

        let mut encoder = Box::new(Bzip2Encoder::new(
            Vec::new(),
            &Bzip2EncoderOptions::default(),
        ));
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut decoder = Bzip2Decoder::new(Cursor::new(&compressed));
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).unwrap();

        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_bzip2_encoder_options() {
        assert_eq!(Bzip2EncoderOptions::default().level, 9);
        assert_eq!(Bzip2EncoderOptions::with_level(5).level, 5);
        assert_eq!(Bzip2EncoderOptions::with_level(0).level, 1); // Clamped
        assert_eq!(Bzip2EncoderOptions::with_level(100).level, 9); // Clamped
    }
}
