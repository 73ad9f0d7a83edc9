//! Compression filter infrastructure.
//!
//! Archives are read through a [`Decoder`] chosen by
//! [`detect_filter`](crate::format::detect_filter) and written through an
//! [`Encoder`] chosen by [`OutputFilter`].

#[cfg(feature = "lzma")]
pub mod lzma;

#[cfg(feature = "deflate")]
pub mod gzip;

#[cfg(feature = "bzip2")]
pub mod bzip2;

#[cfg(feature = "zstd")]
pub mod zstd;

mod copy;

use std::io::{self, BufRead, Read, Write};

use crate::format::CompressionFilter;

/// A decoder that reads compressed data and produces uncompressed output.
pub trait Decoder: Read {
    /// Returns the filter this decoder removes.
    fn filter(&self) -> CompressionFilter;
}

/// An encoder that takes uncompressed data and produces compressed output.
pub trait Encoder<W>: Write {
    /// Returns the filter this encoder applies.
    fn filter(&self) -> CompressionFilter;

    /// Finishes encoding, flushes, and returns the underlying writer.
    fn finish(self: Box<Self>) -> io::Result<W>;
}

pub use copy::{CopyDecoder, CopyEncoder};

#[cfg(feature = "lzma")]
pub use lzma::LzmaDecoder;

#[cfg(feature = "deflate")]
pub use gzip::{GzipDecoder, GzipEncoder, GzipEncoderOptions};

#[cfg(feature = "bzip2")]
pub use bzip2::{Bzip2Decoder, Bzip2Encoder, Bzip2EncoderOptions};

#[cfg(feature = "zstd")]
pub use self::zstd::{ZstdEncoderOptions, ZstdStreamDecoder, ZstdStreamEncoder};

/// Compression applied to the output archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputFilter {
    /// Plain tar.
    #[default]
    None,
    /// gzip with the given level (0-9).
    #[cfg(feature = "deflate")]
    Gzip {
        /// Compression level.
        level: u32,
    },
    /// bzip2 with the given level (1-9).
    #[cfg(feature = "bzip2")]
    Bzip2 {
        /// Compression level.
        level: u32,
    },
    /// Zstandard with the given level (1-22).
    #[cfg(feature = "zstd")]
    Zstd {
        /// Compression level.
        level: i32,
    },
}

impl OutputFilter {
    /// Returns the output filter with default settings for a detected filter.
    ///
    /// Returns `None` when this build cannot write the filter.
    pub fn for_filter(filter: CompressionFilter) -> Option<Self> {
        match filter {
            CompressionFilter::None => Some(OutputFilter::None),
            #[cfg(feature = "deflate")]
            CompressionFilter::Gzip => Some(OutputFilter::Gzip {
                level: GzipEncoderOptions::default().level,
            }),
            #[cfg(feature = "bzip2")]
            CompressionFilter::Bzip2 => Some(OutputFilter::Bzip2 {
                level: Bzip2EncoderOptions::default().level,
            }),
            #[cfg(feature = "zstd")]
            CompressionFilter::Zstd => Some(OutputFilter::Zstd {
                level: ZstdEncoderOptions::default().level,
            }),
            _ => None,
        }
    }

    /// Returns the filter this configuration applies.
    pub fn filter(&self) -> CompressionFilter {
        match self {
            OutputFilter::None => CompressionFilter::None,
            #[cfg(feature = "deflate")]
            OutputFilter::Gzip { .. } => CompressionFilter::Gzip,
            #[cfg(feature = "bzip2")]
            OutputFilter::Bzip2 { .. } => CompressionFilter::Bzip2,
            #[cfg(feature = "zstd")]
            OutputFilter::Zstd { .. } => CompressionFilter::Zstd,
        }
    }
}

/// Builds a decoder for a detected input filter.
///
/// # Errors
///
/// Returns [`io::ErrorKind::Unsupported`] if the filter is not compiled in,
/// or the decoder's own error if its stream header is invalid.
pub fn build_decoder<R: BufRead + 'static>(
    input: R,
    filter: CompressionFilter,
) -> io::Result<Box<dyn Decoder>> {
    match filter {
        CompressionFilter::None => Ok(Box::new(CopyDecoder::new(input))),

        #[cfg(feature = "deflate")]
        CompressionFilter::Gzip => Ok(Box::new(GzipDecoder::new(input))),

        #[cfg(feature = "bzip2")]
        CompressionFilter::Bzip2 => Ok(Box::new(Bzip2Decoder::new(input))),

        #[cfg(feature = "zstd")]
        CompressionFilter::Zstd => Ok(Box::new(ZstdStreamDecoder::new(input)?)),

        #[cfg(feature = "lzma")]
        CompressionFilter::Lzma => Ok(Box::new(LzmaDecoder::new(input)?)),

        other => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{} compression is not supported", other),
        )),
    }
}

/// Builds an encoder for the output archive.
pub fn build_encoder<W: Write + 'static>(
    output: W,
    filter: &OutputFilter,
) -> io::Result<Box<dyn Encoder<W>>> {
    match filter {
        OutputFilter::None => Ok(Box::new(CopyEncoder::new(output))),

        #[cfg(feature = "deflate")]
        OutputFilter::Gzip { level } => Ok(Box::new(GzipEncoder::new(
            output,
            &GzipEncoderOptions::with_level(*level),
        ))),

        #[cfg(feature = "bzip2")]
        OutputFilter::Bzip2 { level } => Ok(Box::new(Bzip2Encoder::new(
            output,
            &Bzip2EncoderOptions::with_level(*level),
        ))),

        #[cfg(feature = "zstd")]
        OutputFilter::Zstd { level } => Ok(Box::new(ZstdStreamEncoder::new(
            output,
            &ZstdEncoderOptions::with_level(*level),
        )?)),
    }
}
