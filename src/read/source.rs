//! The ordered list of inputs of a run.

use std::ffi::OsString;
use std::path::PathBuf;

use super::ArchiveSource;
use crate::Result;

/// Display name used for standard input in diagnostics.
pub const STDIN_NAME: &str = "STDIN";

/// One configured input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// The process's standard input.
    Stdin,
    /// A named file.
    Path(PathBuf),
}

impl SourceSpec {
    /// Returns the name used in diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            SourceSpec::Stdin => STDIN_NAME.to_string(),
            SourceSpec::Path(path) => path.display().to_string(),
        }
    }

    /// Opens the input as an archive.
    pub fn open(&self) -> Result<ArchiveSource> {
        match self {
            SourceSpec::Stdin => ArchiveSource::open_stdin(),
            SourceSpec::Path(path) => ArchiveSource::open_path(path),
        }
    }
}

/// The ordered inputs of a run.
///
/// No names, or exactly one `-`, mean standard input. With two or more names
/// `-` is an ordinary file name: `a.tar -` reads `a.tar` and then a file
/// called `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceList {
    specs: Vec<SourceSpec>,
}

impl SourceList {
    /// Builds the list from command-line operands.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let specs = match args.as_slice() {
            [] => vec![SourceSpec::Stdin],
            [only] if only == "-" => vec![SourceSpec::Stdin],
            _ => args
                .into_iter()
                .map(|arg| SourceSpec::Path(PathBuf::from(arg)))
                .collect(),
        };
        Self { specs }
    }

    /// Builds a list from explicit specs.
    pub fn new(specs: Vec<SourceSpec>) -> Self {
        Self { specs }
    }

    /// Iterates the inputs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceSpec> {
        self.specs.iter()
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if there are no inputs.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a SourceSpec;
    type IntoIter = std::slice::Iter<'a, SourceSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
