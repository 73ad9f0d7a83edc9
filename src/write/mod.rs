//! Output archive writing.
//!
//! [`ArchiveSink`] serializes entries, in order, as a POSIX tar stream,
//! optionally through a compression filter.
//!
//! # Example
//!
//! ```rust
//! use tarsed::read::{Entry, EntryKind, Metadata};
//! use tarsed::write::ArchiveSink;
//!
//! fn main() -> tarsed::Result<()> {
//!     let mut sink = ArchiveSink::new(Vec::new())?;
//!     let entry = Entry::new("hello.txt", EntryKind::File, 5, Metadata::default());
//!     sink.write_header(&entry)?;
//!     sink.write_data(b"hello")?;
//!     sink.finish_entry()?;
//!     let bytes = sink.finish()?;
//!     assert_eq!(bytes.len(), 4 * 512);
//!     Ok(())
//! }
//! ```

mod header_encode;

use std::io::{self, Write};

use log::debug;

use crate::codec::{Encoder, OutputFilter, build_encoder};
use crate::format::{CompressionFilter, END_OF_ARCHIVE_BLOCKS, TAR_BLOCK_SIZE, padding_for};
use crate::read::Entry;
use crate::{Error, Result};

const ZERO_BLOCK: [u8; TAR_BLOCK_SIZE] = [0; TAR_BLOCK_SIZE];

/// The entry whose header has been written and whose data is pending.
struct OpenEntry {
    path: Vec<u8>,
    size: u64,
    written: u64,
}

/// A tar stream being written.
///
/// Each entry goes through [`write_header`](Self::write_header), any number
/// of [`write_data`](Self::write_data) calls totalling exactly the declared
/// size, then [`finish_entry`](Self::finish_entry).
pub struct ArchiveSink<W> {
    encoder: Box<dyn Encoder<W>>,
    current: Option<OpenEntry>,
    entries_written: u64,
}

impl<W> std::fmt::Debug for ArchiveSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSink")
            .field("filter", &self.encoder.filter())
            .field("entries_written", &self.entries_written)
            .finish_non_exhaustive()
    }
}

impl<W: Write + 'static> ArchiveSink<W> {
    /// Creates a sink writing plain tar.
    pub fn new(writer: W) -> Result<Self> {
        Self::with_filter(writer, &OutputFilter::None)
    }

    /// Creates a sink writing through a compression filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteError`] if the encoder cannot be set up.
    pub fn with_filter(writer: W, filter: &OutputFilter) -> Result<Self> {
        let encoder = build_encoder(writer, filter).map_err(|e| Error::write(None, e))?;
        debug!("writing output archive ({} compression)", encoder.filter());
        Ok(Self {
            encoder,
            current: None,
            entries_written: 0,
        })
    }
}

impl<W> ArchiveSink<W> {
    /// The compression filter applied to the output.
    pub fn filter(&self) -> CompressionFilter {
        self.encoder.filter()
    }

    /// Number of entries finished so far.
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Writes the header of `entry`, under its current pathname.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteError`] if the previous entry is unfinished, a
    /// field cannot be represented, or the output fails.
    pub fn write_header(&mut self, entry: &Entry) -> Result<()> {
        let fail = |e| Error::write(Some(entry.path()), e);
        if self.current.is_some() {
            return Err(fail(io::Error::other("previous entry is not finished")));
        }

        let encoded = header_encode::encode_entry_header(entry).map_err(fail)?;
        if let Some((extended, body)) = &encoded.extended {
            self.encoder.write_all(extended.as_bytes()).map_err(fail)?;
            self.encoder.write_all(body).map_err(fail)?;
            self.write_padding(body.len() as u64).map_err(fail)?;
        }
        self.encoder
            .write_all(encoded.header.as_bytes())
            .map_err(fail)?;

        self.current = Some(OpenEntry {
            path: entry.path().to_vec(),
            size: entry.size(),
            written: 0,
        });
        Ok(())
    }

    /// Writes data for the current entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteError`] if there is no current entry, the data
    /// would exceed its declared size, or the output fails.
    pub fn write_data(&mut self, data: &[u8]) -> Result<()> {
        let Some(current) = self.current.as_mut() else {
            return Err(Error::write(None, io::Error::other("no entry is open")));
        };
        let fail = |e| Error::write(Some(&current.path), e);

        let written = current.written + data.len() as u64;
        if written > current.size {
            return Err(fail(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "entry data exceeds declared size of {} bytes",
                    current.size
                ),
            )));
        }
        self.encoder.write_all(data).map_err(fail)?;
        current.written = written;
        Ok(())
    }

    /// Pads the current entry to the block boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteError`] if fewer bytes than declared were
    /// written, or the output fails.
    pub fn finish_entry(&mut self) -> Result<()> {
        let Some(current) = self.current.take() else {
            return Err(Error::write(None, io::Error::other("no entry is open")));
        };
        let fail = |e| Error::write(Some(&current.path), e);

        if current.written != current.size {
            return Err(fail(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "entry data is {} bytes short of declared size {}",
                    current.size - current.written,
                    current.size
                ),
            )));
        }
        self.write_padding(current.size).map_err(fail)?;
        self.entries_written += 1;
        Ok(())
    }

    /// Writes the end-of-archive marker, finishes the compression filter
    /// and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteError`] if an entry is still open or the output
    /// fails.
    pub fn finish(mut self) -> Result<W> {
        if let Some(current) = &self.current {
            return Err(Error::write(
                Some(&current.path),
                io::Error::other("entry is not finished"),
            ));
        }
        for _ in 0..END_OF_ARCHIVE_BLOCKS {
            self.encoder
                .write_all(&ZERO_BLOCK)
                .map_err(|e| Error::write(None, e))?;
        }
        let writer = self.encoder.finish().map_err(|e| Error::write(None, e))?;
        debug!("finished output archive with {} entries", self.entries_written);
        Ok(writer)
    }

    fn write_padding(&mut self, len: u64) -> io::Result<()> {
        let padding = padding_for(len);
        if padding > 0 {
            self.encoder.write_all(&ZERO_BLOCK[..padding])?;
        }
        Ok(())
    }
}
