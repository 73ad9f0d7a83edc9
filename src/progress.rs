//! Progress callbacks for transcoding runs.
//!
//! The transcoder reports what it does through a [`TranscodeObserver`]. All
//! methods have no-op defaults, so an observer only implements what it needs.
//!
//! # Example
//!
//! ```rust
//! use tarsed::progress::TranscodeObserver;
//! use tarsed::read::Entry;
//!
//! #[derive(Default)]
//! struct SkipCounter {
//!     skipped: usize,
//! }
//!
//! impl TranscodeObserver for SkipCounter {
//!     fn on_skip(&mut self, _original: &Entry) {
//!         self.skipped += 1;
//!     }
//! }
//! ```

use crate::read::Entry;

/// Observer of a transcoding run.
pub trait TranscodeObserver {
    /// Called when an input has been opened.
    fn on_source_start(&mut self, name: &str) {
        let _ = name;
    }

    /// Called after an entry has been written under its new pathname.
    ///
    /// `original` is the pathname read from the input.
    fn on_entry(&mut self, original: &[u8], written: &Entry) {
        let _ = (original, written);
    }

    /// Called when the rename result was empty and the entry was dropped.
    fn on_skip(&mut self, original: &Entry) {
        let _ = original;
    }

    /// Called when an input has been fully read.
    fn on_source_complete(&mut self, name: &str, entries: u64) {
        let _ = (name, entries);
    }
}

impl<T: TranscodeObserver + ?Sized> TranscodeObserver for &mut T {
    fn on_source_start(&mut self, name: &str) {
        (**self).on_source_start(name);
    }

    fn on_entry(&mut self, original: &[u8], written: &Entry) {
        (**self).on_entry(original, written);
    }

    fn on_skip(&mut self, original: &Entry) {
        (**self).on_skip(original);
    }

    fn on_source_complete(&mut self, name: &str, entries: u64) {
        (**self).on_source_complete(name, entries);
    }
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl TranscodeObserver for NoObserver {}

/// An observer that records pathnames, for inspection after a run.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Input names, in the order they were opened.
    pub sources: Vec<String>,
    /// `(original, new)` pathnames of written entries.
    pub written: Vec<(Vec<u8>, Vec<u8>)>,
    /// Original pathnames of skipped entries.
    pub skipped: Vec<Vec<u8>>,
}

impl TranscodeObserver for RecordingObserver {
    fn on_source_start(&mut self, name: &str) {
        self.sources.push(name.to_string());
    }

    fn on_entry(&mut self, original: &[u8], written: &Entry) {
        self.written.push((original.to_vec(), written.path().to_vec()));
    }

    fn on_skip(&mut self, original: &Entry) {
        self.skipped.push(original.path().to_vec());
    }
}
