//! The transcoding loop.
//!
//! For every entry of every input: rename, then copy header and data to the
//! output. Entries whose new pathname is empty are dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::ffi::OsStr;
//! use tarsed::progress::NoObserver;
//! use tarsed::read::SourceList;
//! use tarsed::rename::{ChannelOptions, SedChannel};
//! use tarsed::transcode::Transcoder;
//! use tarsed::write::ArchiveSink;
//!
//! fn main() -> tarsed::Result<()> {
//!     let mut sed = SedChannel::spawn(&ChannelOptions::new(), OsStr::new("s/^old/new/"))?;
//!     let sink = ArchiveSink::new(std::io::stdout())?;
//!     let mut transcoder = Transcoder::new(&mut sed, sink);
//!     transcoder.transcode_sources(&SourceList::from_args(["in.tar"]), &mut NoObserver)?;
//!     let (stats, _stdout) = transcoder.finish()?;
//!     eprintln!("{} entries", stats.entries_written);
//!     sed.finish()?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::io::{self, Read};

use log::{debug, info};

use crate::progress::TranscodeObserver;
use crate::read::{ArchiveSource, Entry, EntryData, SourceList};
use crate::rename::Renamer;
use crate::write::ArchiveSink;
use crate::{Error, READ_BUFFER_SIZE, Result};

/// Counters of a transcoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    /// Inputs opened.
    pub sources: u64,
    /// Entries written to the output.
    pub entries_written: u64,
    /// Entries dropped because their new pathname was empty.
    pub entries_skipped: u64,
    /// Entry data bytes copied.
    pub data_bytes: u64,
}

impl TranscodeStats {
    /// Entries read from all inputs.
    pub fn entries_read(&self) -> u64 {
        self.entries_written + self.entries_skipped
    }
}

impl fmt::Display for TranscodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sources, {} entries written, {} skipped, {} data bytes",
            self.sources, self.entries_written, self.entries_skipped, self.data_bytes
        )
    }
}

/// Drives entries from sources through a renamer into a sink.
pub struct Transcoder<N, W> {
    renamer: N,
    sink: ArchiveSink<W>,
    stats: TranscodeStats,
    buffer: Vec<u8>,
}

impl<N, W> fmt::Debug for Transcoder<N, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("sink", &self.sink)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<N: Renamer, W> Transcoder<N, W> {
    /// Creates a transcoder.
    ///
    /// Pass the renamer by `&mut` to keep ownership, for example to shut down
    /// a [`SedChannel`](crate::rename::SedChannel) after the run.
    pub fn new(renamer: N, sink: ArchiveSink<W>) -> Self {
        Self {
            renamer,
            sink,
            stats: TranscodeStats::default(),
            buffer: vec![0; READ_BUFFER_SIZE],
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> TranscodeStats {
        self.stats
    }

    /// Opens and transcodes each input in order.
    ///
    /// Each input is closed before the next one is opened.
    pub fn transcode_sources(
        &mut self,
        sources: &SourceList,
        observer: &mut dyn TranscodeObserver,
    ) -> Result<()> {
        for spec in sources {
            let mut source = spec.open()?;
            self.transcode_source(&mut source, observer)?;
        }
        Ok(())
    }

    /// Transcodes every entry of one input.
    ///
    /// # Errors
    ///
    /// Stops at the first error; entries already written stay in the output.
    pub fn transcode_source(
        &mut self,
        source: &mut ArchiveSource,
        observer: &mut dyn TranscodeObserver,
    ) -> Result<()> {
        self.stats.sources += 1;
        observer.on_source_start(source.name());
        let before = self.stats;

        {
            let mut entries = source.entries()?;
            while let Some(next) = entries.next_entry()? {
                let (entry, mut data) = next.into_parts();
                self.transcode_entry(entry, &mut data, observer)?;
            }
        }

        let written = self.stats.entries_written - before.entries_written;
        let skipped = self.stats.entries_skipped - before.entries_skipped;
        info!(
            "{}: {} entries written, {} skipped",
            source.name(),
            written,
            skipped
        );
        observer.on_source_complete(source.name(), written);
        Ok(())
    }

    fn transcode_entry(
        &mut self,
        mut entry: Entry,
        data: &mut EntryData<'_>,
        observer: &mut dyn TranscodeObserver,
    ) -> Result<()> {
        let original = entry.path().to_vec();
        let renamed = self.renamer.rename(&original)?;
        if renamed.is_empty() {
            debug!("{}: dropped", entry.display_path());
            observer.on_skip(&entry);
            self.stats.entries_skipped += 1;
            return Ok(());
        }

        entry.set_path(renamed);
        debug!(
            "{} -> {}",
            crate::error::display_path(&original),
            entry.display_path()
        );
        self.sink.write_header(&entry)?;
        if entry.size() > 0 {
            self.copy_data(&original, entry.size(), data)?;
        }
        self.sink.finish_entry()?;

        self.stats.entries_written += 1;
        self.stats.data_bytes += entry.size();
        observer.on_entry(&original, &entry);
        Ok(())
    }

    /// Copies exactly `size` bytes, one buffer at a time.
    fn copy_data(&mut self, original: &[u8], size: u64, data: &mut impl Read) -> Result<()> {
        let mut remaining = size;
        while remaining > 0 {
            let want = remaining.min(self.buffer.len() as u64) as usize;
            let n = match data.read(&mut self.buffer[..want]) {
                Ok(0) => {
                    return Err(Error::read(
                        original,
                        io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!(
                                "entry data truncated: {} of {} bytes missing",
                                remaining, size
                            ),
                        ),
                    ));
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::read(original, e)),
            };
            self.sink.write_data(&self.buffer[..n])?;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Finishes the output archive.
    ///
    /// Returns the run's counters and the underlying writer.
    pub fn finish(self) -> Result<(TranscodeStats, W)> {
        let writer = self.sink.finish()?;
        info!("transcoded {}", self.stats);
        Ok((self.stats, writer))
    }
}

/// Transcodes `sources` into `sink` and finishes it.
pub fn run<N: Renamer, W>(
    sources: &SourceList,
    renamer: N,
    sink: ArchiveSink<W>,
    observer: &mut dyn TranscodeObserver,
) -> Result<(TranscodeStats, W)> {
    let mut transcoder = Transcoder::new(renamer, sink);
    transcoder.transcode_sources(sources, observer)?;
    transcoder.finish()
}
