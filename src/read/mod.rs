//! Archive reading: one input presented as an ordered, lazy entry sequence.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io::Read;
//! use tarsed::read::ArchiveSource;
//!
//! fn main() -> tarsed::Result<()> {
//!     let mut source = ArchiveSource::open_path("backup.tar.gz")?;
//!     let mut entries = source.entries()?;
//!     while let Some(next) = entries.next_entry()? {
//!         let (entry, mut data) = next.into_parts();
//!         let mut contents = Vec::new();
//!         data.read_to_end(&mut contents)?;
//!         println!("{}: {} bytes", entry.display_path(), contents.len());
//!     }
//!     Ok(())
//! }
//! ```

mod entry;
mod source;

pub use entry::{Entry, EntryKind, Metadata};
pub use source::{STDIN_NAME, SourceList, SourceSpec};

use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;

use log::debug;
use tar::EntryType;

use crate::codec::{Decoder, build_decoder};
use crate::format::detect::FILTER_PROBE_LEN;
use crate::format::{CompressionFilter, ContainerProbe, TAR_BLOCK_SIZE};
use crate::{Error, READ_BUFFER_SIZE, Result};

/// Decompressed input stream, with the probed first block put back in front.
type SourceReader = Chain<Cursor<Vec<u8>>, Box<dyn Decoder>>;

/// Reads up to `limit` bytes, stopping early only at end of stream.
fn peek<R: Read>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(limit);
    reader.by_ref().take(limit as u64).read_to_end(&mut head)?;
    Ok(head)
}

/// One opened input archive.
pub struct ArchiveSource {
    name: String,
    filter: CompressionFilter,
    archive: tar::Archive<SourceReader>,
}

impl std::fmt::Debug for ArchiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSource")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl ArchiveSource {
    /// Opens an archive from a buffered reader.
    ///
    /// The compression filter and the container are detected from the data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreadableArchive`] if the input cannot be read, uses
    /// an unsupported filter, or is not a tar archive.
    pub fn open<R: BufRead + 'static>(input: R, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut input = input;

        let head = peek(&mut input, FILTER_PROBE_LEN)
            .map_err(|e| Error::unreadable(&name, e.to_string()))?;
        let filter = crate::format::detect_filter(&head);
        if !filter.is_supported() {
            return Err(Error::unreadable(
                &name,
                format!("{} compression is not supported", filter),
            ));
        }

        let input = Cursor::new(head).chain(input);
        let mut decoder =
            build_decoder(input, filter).map_err(|e| Error::unreadable(&name, e.to_string()))?;

        let block = peek(&mut decoder, TAR_BLOCK_SIZE)
            .map_err(|e| Error::unreadable(&name, e.to_string()))?;
        match crate::format::probe_container(&block) {
            ContainerProbe::Empty | ContainerProbe::Tar => {}
            ContainerProbe::Foreign(format) => {
                return Err(Error::unreadable(
                    &name,
                    format!("unsupported archive format: {}", format),
                ));
            }
            ContainerProbe::Unrecognized => {
                return Err(Error::unreadable(&name, "unrecognized archive format"));
            }
            ContainerProbe::Truncated => {
                return Err(Error::unreadable(&name, "truncated archive header"));
            }
        }

        debug!("opened {} ({} compression)", name, filter);
        Ok(Self {
            name,
            filter,
            archive: tar::Archive::new(Cursor::new(block).chain(decoder)),
        })
    }

    /// Opens an archive file.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::unreadable(&name, e.to_string()))?;
        Self::open(BufReader::with_capacity(READ_BUFFER_SIZE, file), name)
    }

    /// Opens the archive on standard input.
    pub fn open_stdin() -> Result<Self> {
        Self::open(io::stdin().lock(), STDIN_NAME)
    }

    /// The display name of the input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The detected compression filter.
    pub fn filter(&self) -> CompressionFilter {
        self.filter
    }

    /// Starts iterating the entries.
    ///
    /// May be called once per source.
    pub fn entries(&mut self) -> Result<SourceEntries<'_>> {
        let name = &self.name;
        let inner = self
            .archive
            .entries()
            .map_err(|e| Error::corrupt(name, e))?;
        Ok(SourceEntries { input: name, inner })
    }
}

/// Lazy entry sequence of one source.
pub struct SourceEntries<'a> {
    input: &'a str,
    inner: tar::Entries<'a, SourceReader>,
}

impl<'a> SourceEntries<'a> {
    /// Reads the next entry header.
    ///
    /// Returns `Ok(None)` at the end of the archive. Any data of the previous
    /// entry that was not read is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptEntry`] on a malformed header.
    pub fn next_entry(&mut self) -> Result<Option<SourceEntry<'a>>> {
        loop {
            let Some(next) = self.inner.next() else {
                return Ok(None);
            };
            let mut raw = next.map_err(|e| Error::corrupt(self.input, e))?;

            let entry_type = raw.header().entry_type();
            if entry_type == EntryType::XGlobalHeader {
                debug!("{}: skipping pax global header", self.input);
                continue;
            }

            let entry = Entry::from_tar(&mut raw).map_err(|e| Error::corrupt(self.input, e))?;
            return Ok(Some(SourceEntry {
                entry,
                data: EntryData { inner: raw },
            }));
        }
    }
}

/// An entry header together with its data stream.
pub struct SourceEntry<'a> {
    entry: Entry,
    data: EntryData<'a>,
}

impl<'a> SourceEntry<'a> {
    /// The entry header.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// The data stream.
    pub fn data(&mut self) -> &mut EntryData<'a> {
        &mut self.data
    }

    /// Splits into the header and the data stream.
    pub fn into_parts(self) -> (Entry, EntryData<'a>) {
        (self.entry, self.data)
    }
}

/// The data section of one entry, exactly `size` bytes long when intact.
///
/// A truncated section shows up as an early end of stream; the transcoder
/// counts bytes and reports the shortfall.
pub struct EntryData<'a> {
    inner: tar::Entry<'a, SourceReader>,
}

impl Read for EntryData<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
