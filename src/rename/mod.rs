//! Pathname renaming.
//!
//! A [`Renamer`] maps one pathname to its replacement. The production
//! implementation is [`SedChannel`], which keeps one `sed` process alive for
//! the whole run and talks to it in NUL-terminated records. [`FnRenamer`] and
//! [`MapRenamer`] rename in-process.
//!
//! An empty result means "drop this entry".

mod channel;
mod sed;

pub use channel::RecordChannel;
pub use sed::{ChannelOptions, DEFAULT_PATH_LIMIT, SedChannel};

use std::collections::HashMap;

use crate::Result;

/// Maps original pathnames to new ones.
///
/// Calls are answered strictly in submission order, one result per call.
pub trait Renamer {
    /// Returns the new pathname for `path`.
    ///
    /// An empty result asks the caller to skip the entry.
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Renamer + ?Sized> Renamer for &mut T {
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        (**self).rename(path)
    }
}

impl<T: Renamer + ?Sized> Renamer for Box<T> {
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        (**self).rename(path)
    }
}

/// Renames with a closure.
pub struct FnRenamer<F> {
    rename: F,
}

impl<F: FnMut(&[u8]) -> Vec<u8>> FnRenamer<F> {
    /// Wraps a closure.
    pub fn new(rename: F) -> Self {
        Self { rename }
    }
}

impl<F: FnMut(&[u8]) -> Vec<u8>> Renamer for FnRenamer<F> {
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        Ok((self.rename)(path))
    }
}

impl<F> std::fmt::Debug for FnRenamer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRenamer").finish_non_exhaustive()
    }
}

/// Renames through a lookup table; unmapped paths keep their name.
#[derive(Debug, Clone, Default)]
pub struct MapRenamer {
    map: HashMap<Vec<u8>, Vec<u8>>,
}

impl MapRenamer {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping. An empty `to` drops the entry.
    pub fn with(mut self, from: impl Into<Vec<u8>>, to: impl Into<Vec<u8>>) -> Self {
        self.map.insert(from.into(), to.into());
        self
    }
}

impl Renamer for MapRenamer {
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        Ok(self
            .map
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_vec()))
    }
}
