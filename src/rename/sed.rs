//! The `sed` child process.

use std::ffi::{OsStr, OsString};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use log::debug;

use super::{RecordChannel, Renamer};
use crate::{Error, Result};

/// Longest accepted rename result, terminator included (Linux `PATH_MAX`).
pub const DEFAULT_PATH_LIMIT: usize = 4096;

/// How to launch the substitution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOptions {
    program: PathBuf,
    sandbox: bool,
    path_limit: usize,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("sed"),
            sandbox: true,
            path_limit: DEFAULT_PATH_LIMIT,
        }
    }
}

impl ChannelOptions {
    /// Creates options with the defaults: `sed` from `PATH`, sandboxed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the program to run.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Enables or disables `--sandbox`, which rejects the `e`, `r` and `w`
    /// commands.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Sets the rename result limit, terminator included.
    pub fn path_limit(mut self, limit: usize) -> Self {
        self.path_limit = limit.max(1);
        self
    }

    /// The configured program.
    pub fn program_path(&self) -> &std::path::Path {
        &self.program
    }

    /// Builds the command line for `expression`.
    pub fn command(&self, expression: &OsStr) -> Command {
        let mut command = Command::new(&self.program);
        if self.sandbox {
            command.arg("--sandbox");
        }
        command
            .arg("--unbuffered")
            .arg("--null-data")
            .arg("-e")
            .arg(expression);
        command
    }
}

/// A running `sed` that renames one pathname per record.
///
/// Dropping an unfinished channel closes both pipes and reaps the process.
pub struct SedChannel {
    child: Child,
    channel: Option<RecordChannel<ChildStdin, BufReader<ChildStdout>>>,
    program: PathBuf,
}

impl std::fmt::Debug for SedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SedChannel")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

impl SedChannel {
    /// Starts `sed` with `expression`.
    ///
    /// The expression is passed unchanged; `sed` itself reports syntax
    /// errors, which surface as [`Error::ChannelBroken`] on the first rename.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelSetup`] if the process cannot be started.
    pub fn spawn(options: &ChannelOptions, expression: &OsStr) -> Result<Self> {
        let setup = |source| Error::ChannelSetup {
            program: options.program.clone(),
            source,
        };

        let mut command = options.command(expression);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        let mut child = command.spawn().map_err(setup)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(setup(io::Error::other("child pipes were not created")));
        };

        debug!(
            "started {} (pid {}) with expression {:?}",
            options.program.display(),
            child.id(),
            OsString::from(expression)
        );
        Ok(Self {
            child,
            channel: Some(RecordChannel::new(
                stdin,
                BufReader::new(stdout),
                options.path_limit,
            )),
            program: options.program.clone(),
        })
    }

    /// Closes the input, drains the output and waits for `sed` to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if waiting for the process fails.
    pub fn finish(mut self) -> Result<ExitStatus> {
        if let Some(channel) = self.channel.take() {
            let (stdin, mut stdout) = channel.into_inner();
            drop(stdin);
            // Output after the last response is not ours; discard it.
            let _ = io::copy(&mut stdout, &mut io::sink());
        }
        let status = self.child.wait()?;
        debug!("{} exited with {}", self.program.display(), status);
        Ok(status)
    }
}

impl Renamer for SedChannel {
    fn rename(&mut self, path: &[u8]) -> Result<Vec<u8>> {
        match self.channel.as_mut() {
            Some(channel) => channel.submit(path),
            None => Err(Error::ChannelBroken {
                path: crate::error::display_path(path),
                source: io::Error::new(io::ErrorKind::BrokenPipe, "channel is closed"),
            }),
        }
    }
}

impl Drop for SedChannel {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            drop(channel);
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &Command) -> Vec<&OsStr> {
        command.get_args().collect()
    }

    #[test]
    fn test_default_command_line() {
        let command = ChannelOptions::new().command(OsStr::new("s/a/b/"));
        assert_eq!(command.get_program(), "sed");
        assert_eq!(
            args(&command),
            ["--sandbox", "--unbuffered", "--null-data", "-e", "s/a/b/"]
        );
    }

    #[test]
    fn test_without_sandbox() {
        let options = ChannelOptions::new().program("/usr/bin/gsed").sandbox(false);
        let command = options.command(OsStr::new("s/x//"));
        assert_eq!(command.get_program(), "/usr/bin/gsed");
        assert_eq!(args(&command), ["--unbuffered", "--null-data", "-e", "s/x//"]);
    }

    #[test]
    fn test_path_limit_is_at_least_one() {
        assert_eq!(ChannelOptions::new().path_limit(0).path_limit, 1);
        assert_eq!(ChannelOptions::new().path_limit, DEFAULT_PATH_LIMIT);
    }

    #[test]
    fn test_missing_program_is_setup_error() {
        let options = ChannelOptions::new().program("/nonexistent/tarsed-test-sed");
        let err = SedChannel::spawn(&options, OsStr::new("p")).unwrap_err();
        assert!(matches!(err, Error::ChannelSetup { .. }));
        assert!(err.to_string().contains("/nonexistent/tarsed-test-sed"));
    }
}
