//! Fuzz target for RecordChannel with arbitrary engine responses.
//!
//! The first byte is the path limit, the rest is what the engine "printed".
//! Requests are submitted until the responses run out or the channel reports
//! an error.
//!
//! Run with: cargo +nightly fuzz run record_channel
//!
//! Properties checked:
//! - A response never contains the NUL terminator
//! - A response is always shorter than the limit

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use tarsed::RecordChannel;

fuzz_target!(|data: &[u8]| {
    let Some((&limit, responses)) = data.split_first() else {
        return;
    };
    let limit = usize::from(limit).max(1);
    let mut channel = RecordChannel::new(Vec::new(), Cursor::new(responses.to_vec()), limit);

    // Every successful submit consumes at least one byte until end of stream
    for _ in 0..=responses.len() {
        match channel.submit(b"path") {
            Ok(response) => {
                assert!(!response.contains(&0));
                assert!(response.len() < limit);
            }
            Err(_) => break,
        }
    }
});
