//! Legacy LZMA ("lzma alone") decoder.
//!
//! The stream starts with a 13-byte header: the properties byte, the
//! little-endian dictionary size and the little-endian uncompressed size
//! (all ones when the stream ends with an end marker instead).

use std::io::{self, Read};

use super::Decoder;
use crate::format::CompressionFilter;

/// Size of the legacy LZMA header.
pub const LZMA_ALONE_HEADER_LEN: usize = 13;

/// LZMA decoder.
pub struct LzmaDecoder<R> {
    inner: lzma_rust2::LzmaReader<R>,
}

impl<R> std::fmt::Debug for LzmaDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LzmaDecoder").finish_non_exhaustive()
    }
}

impl<R: Read> LzmaDecoder<R> {
    /// Creates a new LZMA decoder, consuming the stream header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is truncated or its properties are invalid.
    pub fn new(mut input: R) -> io::Result<Self> {
        let mut header = [0u8; LZMA_ALONE_HEADER_LEN];
        input.read_exact(&mut header)?;

        let props_byte = header[0];
        let dict_size = u32::from_le_bytes([header[1], header[2], header[3], header[4]]);
        let mut size_bytes = [0u8; 8];
        size_bytes.copy_from_slice(&header[5..]);
        let uncompressed_size = u64::from_le_bytes(size_bytes);

        let reader = lzma_rust2::LzmaReader::new_with_props(
            input,
            uncompressed_size,
            props_byte,
            dict_size,
            None,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        Ok(Self { inner: reader })
    }
}

impl<R: Read> Read for LzmaDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Decoder for LzmaDecoder<R> {
    fn filter(&self) -> CompressionFilter {
        CompressionFilter::Lzma
    }
}
