//! Zstandard codec implementation.

use std::io::{self, BufRead, Read, Write};

use zstd::stream::read::Decoder as ZstdDecoder;
use zstd::stream::write::Encoder as ZstdEncoderInner;

use super::{Decoder, Encoder};
use crate::format::CompressionFilter;

/// ZSTD decoder.
pub struct ZstdStreamDecoder<R: BufRead> {
    inner: ZstdDecoder<'static, R>,
}

impl<R: BufRead> std::fmt::Debug for ZstdStreamDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdStreamDecoder").finish_non_exhaustive()
    }
}

impl<R: BufRead> ZstdStreamDecoder<R> {
    /// Creates a new ZSTD decoder reading from an already buffered source.
    pub fn new(input: R) -> io::Result<Self> {
        let decoder = ZstdDecoder::with_buffer(input)?;
        Ok(Self { inner: decoder })
    }
}

impl<R: BufRead> Read for ZstdStreamDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead> Decoder for ZstdStreamDecoder<R> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Zstd
    }
}

/// ZSTD encoder options.
#[derive(Debug, Clone)]
pub struct ZstdEncoderOptions {
    /// Compression level (1-22, default 3).
    pub level: i32,
}

impl Default for ZstdEncoderOptions {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl ZstdEncoderOptions {
    /// Creates options with the given compression level.
    pub fn with_level(level: i32) -> Self {
        Self {
            level: level.clamp(1, 22),
        }
    }
}

/// ZSTD encoder.
pub struct ZstdStreamEncoder<W: Write> {
    inner: ZstdEncoderInner<'static, W>,
}

impl<W: Write> std::fmt::Debug for ZstdStreamEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdStreamEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> ZstdStreamEncoder<W> {
    /// Creates a new ZSTD encoder.
    pub fn new(output: W, options: &ZstdEncoderOptions) -> io::Result<Self> {
        let encoder = ZstdEncoderInner::new(output, options.level)?;
        Ok(Self { inner: encoder })
    }
}

impl<W: Write> Write for ZstdStreamEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder<W> for ZstdStreamEncoder<W> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Zstd
    }

    fn finish(self: Box<Self>) -> io::Result<W> {
        self.inner.finish()
    }
}
