//! Error types for archive transcoding.
//!
//! This module provides the [`Error`] enum which represents every fatal
//! condition of a transcoding run, along with a convenient [`Result<T>`] type
//! alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Every
//! variant except [`Error::Io`] carries the most specific subject known at the
//! point of failure (an input name, an original pathname, or a renamed
//! pathname), available through [`Error::subject`]:
//!
//! ```rust,no_run
//! use tarsed::read::ArchiveSource;
//!
//! fn count_entries(path: &str) -> tarsed::Result<usize> {
//!     let mut source = ArchiveSource::open_path(path)?;
//!     let mut entries = source.entries()?;
//!     let mut count = 0;
//!     while entries.next_entry()?.is_some() {
//!         count += 1;
//!     }
//!     Ok(count)
//! }
//!
//! fn main() {
//!     if let Err(e) = count_entries("input.tar") {
//!         eprintln!("{}: {}", e.subject().unwrap_or("tarsed"), e);
//!     }
//! }
//! ```
//!
//! An empty rename result is not an error: the transcoder skips the entry and
//! reports it through [`TranscodeObserver::on_skip`].
//!
//! [`TranscodeObserver::on_skip`]: crate::progress::TranscodeObserver::on_skip

use std::io;
use std::path::PathBuf;

/// The main error type for transcoding operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Channel | [`ChannelSetup`][Self::ChannelSetup], [`ChannelBroken`][Self::ChannelBroken], [`PathTooLong`][Self::PathTooLong] | The substitution engine |
/// | Input | [`UnreadableArchive`][Self::UnreadableArchive], [`CorruptEntry`][Self::CorruptEntry], [`ReadError`][Self::ReadError] | Damaged or foreign input |
/// | Output | [`WriteError`][Self::WriteError] | Unrepresentable entry, closed output |
/// | Other | [`Io`][Self::Io] | Everything else |
///
/// All of them are fatal: the run stops at the first one.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error with no more specific context.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The substitution engine could not be started.
    #[error("failed to start substitution engine '{}': {source}", program.display())]
    ChannelSetup {
        /// The program that was launched.
        program: PathBuf,
        /// The underlying spawn error.
        source: io::Error,
    },

    /// The pipe to or from the substitution engine failed.
    ///
    /// Usually the engine exited early, for example because the expression
    /// was rejected.
    #[error("substitution engine failed: {source}")]
    ChannelBroken {
        /// The pathname being renamed when the channel broke.
        path: String,
        /// The underlying pipe error.
        source: io::Error,
    },

    /// The renamed pathname exceeded the path length limit.
    #[error("path length limit exceeded after substitution (limit {limit} bytes)")]
    PathTooLong {
        /// The original pathname.
        path: String,
        /// The limit in bytes, including the terminator.
        limit: usize,
    },

    /// An input is not a recognized or well-formed archive.
    #[error("{reason}")]
    UnreadableArchive {
        /// Display name of the input.
        input: String,
        /// Description of the problem.
        reason: String,
    },

    /// An entry header in an input archive is malformed.
    #[error("{error}")]
    CorruptEntry {
        /// Display name of the input.
        input: String,
        /// The decoding error.
        #[source]
        error: io::Error,
    },

    /// The data section of an entry could not be read in full.
    #[error("read error: {error}")]
    ReadError {
        /// The original pathname of the entry.
        path: String,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The output archive could not be written.
    #[error("{error}")]
    WriteError {
        /// The renamed pathname of the entry, or `None` for archive framing.
        path: Option<String>,
        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

impl Error {
    /// Returns the most specific subject associated with this error, if any.
    ///
    /// This is the prefix of a diagnostic line. `None` means the error
    /// concerns the run as a whole and callers should use the program name.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Error::Io(_) | Error::ChannelSetup { .. } => None,
            Error::ChannelBroken { path, .. }
            | Error::PathTooLong { path, .. }
            | Error::ReadError { path, .. } => Some(path.as_str()),
            Error::UnreadableArchive { input, .. } | Error::CorruptEntry { input, .. } => {
                Some(input.as_str())
            }
            Error::WriteError { path, .. } => path.as_deref(),
        }
    }

    /// Returns `true` if the error comes from an input archive.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::UnreadableArchive { .. } | Error::CorruptEntry { .. } | Error::ReadError { .. }
        )
    }

    /// Returns `true` if the error comes from the output archive.
    pub fn is_output_error(&self) -> bool {
        matches!(self, Error::WriteError { .. })
    }

    /// Returns `true` if the error comes from the substitution engine.
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            Error::ChannelSetup { .. } | Error::ChannelBroken { .. } | Error::PathTooLong { .. }
        )
    }

    pub(crate) fn unreadable(input: &str, reason: impl Into<String>) -> Self {
        Error::UnreadableArchive {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(input: &str, error: io::Error) -> Self {
        Error::CorruptEntry {
            input: input.to_string(),
            error,
        }
    }

    pub(crate) fn read(path: &[u8], error: io::Error) -> Self {
        Error::ReadError {
            path: display_path(path),
            error,
        }
    }

    pub(crate) fn write(path: Option<&[u8]>, error: io::Error) -> Self {
        Error::WriteError {
            path: path.map(display_path),
            error,
        }
    }
}

/// Renders a raw pathname for diagnostics.
pub(crate) fn display_path(path: &[u8]) -> String {
    String::from_utf8_lossy(path).into_owned()
}

/// A specialized Result type for transcoding operations.
pub type Result<T> = std::result::Result<T, Error>;
