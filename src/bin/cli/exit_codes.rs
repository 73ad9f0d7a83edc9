//! Exit codes for the CLI tool.

use std::process::ExitStatus;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 1;
/// Invalid command line arguments (matches clap's usage error code)
pub const BAD_ARGS: i32 = 2;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArgs,
    /// sed exited with this non-zero status
    Engine(i32),
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArgs => BAD_ARGS,
            Self::Engine(code) => code,
        }
    }

    /// Maps how sed exited; killed by a signal counts as a fatal error.
    pub fn from_engine_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(SUCCESS) => Self::Success,
            Some(code) => Self::Engine(code),
            None => Self::FatalError,
        }
    }
}
