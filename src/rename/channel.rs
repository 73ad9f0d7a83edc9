//! NUL-terminated request/response records over a byte transport.

use std::io::{BufRead, Read, Write};

use super::Renamer;
use crate::error::display_path;
use crate::{Error, Result};

/// Turns a pair of byte streams into a synchronous rename function.
///
/// Each request is the pathname followed by NUL. Each response is read up to
/// and including the next NUL; end of stream also ends a response. A response
/// that fills `limit` bytes without a terminator is rejected.
///
/// # Transport requirements
///
/// The peer must answer every record before reading the next one, and `W`
/// must not buffer: a request still sitting in a buffer would never be
/// answered and [`submit`](Self::submit) would block forever. `submit`
/// flushes after every request, so a buffered `W` is tolerated, but unbuffered
/// pipes are what this is built for.
#[derive(Debug)]
pub struct RecordChannel<W, R> {
    requests: W,
    responses: R,
    limit: usize,
}

impl<W: Write, R: BufRead> RecordChannel<W, R> {
    /// Creates a channel. `limit` counts the terminator.
    pub fn new(requests: W, responses: R, limit: usize) -> Self {
        Self {
            requests,
            responses,
            limit,
        }
    }

    /// The response length limit, terminator included.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sends one pathname and waits for its replacement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelBroken`] if the transport fails and
    /// [`Error::PathTooLong`] if the response has no terminator within the
    /// limit.
    pub fn submit(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        let broken = |source| Error::ChannelBroken {
            path: display_path(path),
            source,
        };

        self.requests.write_all(path).map_err(broken)?;
        self.requests.write_all(&[0]).map_err(broken)?;
        self.requests.flush().map_err(broken)?;

        let mut response = Vec::new();
        (&mut self.responses)
            .take(self.limit as u64)
            .read_until(0, &mut response)
            .map_err(broken)?;

        if response.last() == Some(&0) {
            response.pop();
        } else if response.len() == self.limit {
            return Err(Error::PathTooLong {
                path: display_path(path),
                limit: self.limit,
            });
        }
        Ok(response)
    }

    /// Splits the channel into its transport halves.
    pub fn into_inner(self) -> (W, R) {
        (self.requests, self.responses)
    }
}

impl<W: Write, R: BufRead> Renamer for RecordChannel<W, R> {
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        self.submit(path)
    }
}
