//! Copy codec (no compression).

use std::io::{self, Read, Write};

use super::{Decoder, Encoder};
use crate::format::CompressionFilter;

/// A decoder that passes data through unchanged.
pub struct CopyDecoder<R> {
    inner: R,
}

impl<R: Read> CopyDecoder<R> {
    /// Creates a new copy decoder.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for CopyDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Decoder for CopyDecoder<R> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::None
    }
}

/// An encoder that passes data through unchanged.
pub struct CopyEncoder<W> {
    inner: W,
}

impl<W: Write> CopyEncoder<W> {
    /// Creates a new copy encoder.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for CopyEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder<W> for CopyEncoder<W> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::None
    }

    fn finish(mut self: Box<Self>) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
