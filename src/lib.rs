//! # tarsed
//!
//! Rename the entries of tar archives with a `sed` expression, without
//! extracting them.
//!
//! Every entry pathname is piped through one long-lived `sed` process as a
//! NUL-terminated record, and the entry is written, data and metadata
//! unchanged, to a new tar stream under the returned name. An empty result
//! drops the entry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::ffi::OsStr;
//! use std::io::{self, Write};
//! use tarsed::progress::NoObserver;
//! use tarsed::read::SourceList;
//! use tarsed::rename::{ChannelOptions, SedChannel};
//! use tarsed::write::ArchiveSink;
//!
//! fn main() -> tarsed::Result<()> {
//!     let mut sed = SedChannel::spawn(&ChannelOptions::new(), OsStr::new("s|^src/|lib/|"))?;
//!     let sources = SourceList::from_args(["project.tar.gz"]);
//!     let sink = ArchiveSink::new(io::BufWriter::new(io::stdout()))?;
//!
//!     let (stats, mut out) = tarsed::transcode::run(&sources, &mut sed, sink, &mut NoObserver)?;
//!     out.flush()?;
//!     sed.finish()?;
//!     eprintln!("{}", stats);
//!     Ok(())
//! }
//! ```
//!
//! Tests and other in-process callers can rename without `sed`:
//!
//! ```rust
//! use tarsed::rename::{MapRenamer, Renamer};
//!
//! let mut renamer = MapRenamer::new().with("old/name.txt", "new/name.txt");
//! assert_eq!(renamer.rename(b"old/name.txt").unwrap(), b"new/name.txt");
//! ```
//!
//! ## Input Formats
//!
//! Inputs are tar archives (ustar, pax or GNU), plain or compressed. The
//! compression filter is detected from the data, not from the file name.
//!
//! | Filter | Feature | Read | Write |
//! |--------|---------|------|-------|
//! | none | - | Yes | Yes |
//! | gzip | `deflate` | Yes | Yes |
//! | bzip2 | `bzip2` | Yes | Yes |
//! | zstd | `zstd` | Yes | Yes |
//! | lzma (legacy `.lzma`) | `lzma` | Yes | No |
//! | xz, lz4, compress | - | No | No |
//!
//! The output is always POSIX tar: ustar headers, preceded by a pax extended
//! header when a pathname, link target or owner name does not fit.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | gzip input and output |
//! | `bzip2` | Yes | bzip2 input and output |
//! | `lzma` | Yes | Legacy lzma input |
//! | `zstd` | Yes | Zstandard input and output |
//! | `cli` | Yes | The `tarsed` command-line tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Every error is fatal except an empty
//! rename, which only skips the entry. [`Error::subject`] names what the error
//! is about:
//!
//! ```rust,no_run
//! use tarsed::read::ArchiveSource;
//!
//! match ArchiveSource::open_path("notes.txt") {
//!     Ok(_) => {}
//!     Err(e) => eprintln!("{}: {}", e.subject().unwrap_or("tarsed"), e),
//! }
//! ```
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod codec;
pub mod error;
pub mod format;
pub mod progress;
pub mod read;
pub mod rename;
pub mod transcode;
pub mod write;

pub use error::{Error, Result};

// Re-export the transcoding API at crate root for convenience
pub use progress::{NoObserver, TranscodeObserver};
pub use read::{ArchiveSource, Entry, EntryKind, Metadata, SourceList, SourceSpec};
pub use rename::{ChannelOptions, FnRenamer, MapRenamer, RecordChannel, Renamer, SedChannel};
pub use transcode::{TranscodeStats, Transcoder};
pub use write::ArchiveSink;

pub use codec::OutputFilter;
pub use format::CompressionFilter;
