//! gzip codec implementation.

use std::io::{self, BufRead, Read, Write};

use flate2::Compression;
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;

use super::{Decoder, Encoder};
use crate::format::CompressionFilter;

/// gzip decoder.
///
/// Concatenated gzip members are decoded as one stream.
pub struct GzipDecoder<R> {
    inner: MultiGzDecoder<R>,
}

impl<R> std::fmt::Debug for GzipDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipDecoder").finish_non_exhaustive()
    }
}

impl<R: BufRead> GzipDecoder<R> {
    /// Creates a new gzip decoder.
    ///
    /// # Arguments
    ///
    /// * `input` - The compressed data source (must implement BufRead)
    pub fn new(input: R) -> Self {
        Self {
            inner: MultiGzDecoder::new(input),
        }
    }
}

impl<R: BufRead> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead> Decoder for GzipDecoder<R> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Gzip
    }
}

/// gzip encoder options.
#[derive(Debug, Clone)]
pub struct GzipEncoderOptions {
    /// Compression level (0-9, default 6).
    pub level: u32,
}

impl Default for GzipEncoderOptions {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl GzipEncoderOptions {
    /// Creates options with the given compression level.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

/// gzip encoder.
pub struct GzipEncoder<W: Write> {
    inner: GzEncoder<W>,
}

impl<W: Write> std::fmt::Debug for GzipEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> GzipEncoder<W> {
    /// Creates a new gzip encoder.
    pub fn new(output: W, options: &GzipEncoderOptions) -> Self {
        Self {
            inner: GzEncoder::new(output, Compression::new(options.level)),
        }
    }
}

impl<W: Write> Write for GzipEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder<W> for GzipEncoder<W> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Gzip
    }

    fn finish(self: Box<Self>) -> io::Result<W> {
        self.inner.finish()
    }
}
