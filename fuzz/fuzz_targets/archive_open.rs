//! Fuzz target for ArchiveSource::open with arbitrary byte input.
//!
//! Opens the bytes as an input archive and, if that succeeds, transcodes every
//! entry with an identity renamer. Errors are expected; panics and hangs are
//! not.
//!
//! Run with: cargo +nightly fuzz run archive_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use tarsed::{ArchiveSink, ArchiveSource, MapRenamer, NoObserver, Transcoder};

fuzz_target!(|data: &[u8]| {
    let Ok(mut source) = ArchiveSource::open(Cursor::new(data.to_vec()), "fuzz") else {
        return;
    };
    let Ok(sink) = ArchiveSink::new(Vec::new()) else {
        return;
    };

    let mut transcoder = Transcoder::new(MapRenamer::new(), sink);
    if transcoder.transcode_source(&mut source, &mut NoObserver).is_ok() {
        // Whatever was accepted must come back out as a readable archive
        let (stats, output) = transcoder.finish().unwrap();
        let mut reread = ArchiveSource::open(Cursor::new(output), "output").unwrap();
        let mut entries = reread.entries().unwrap();
        let mut count = 0;
        while entries.next_entry().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, stats.entries_written);
    }
});
