//! Command implementation for the CLI tool.

use std::ffi::{OsStr, OsString};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tarsed::{
    ArchiveSink, ChannelOptions, Error, OutputFilter, SedChannel, SourceList, TranscodeStats,
};

use crate::Compress;
use crate::exit_codes::ExitCode;
use crate::output::{SkipNotices, output_filter};

/// Prefix of diagnostics that have no more specific subject.
const PROGRAM: &str = "tarsed";

/// Configuration for a transcoding run.
pub struct TranscodeConfig<'a> {
    pub expression: &'a OsStr,
    pub files: &'a [OsString],
    pub sed: &'a Path,
    pub sandbox: bool,
    pub compress: Compress,
}

/// Transcode command implementation
pub fn transcode(config: &TranscodeConfig<'_>) -> ExitCode {
    let filter = match output_filter(config.compress) {
        Ok(filter) => filter,
        Err(msg) => {
            eprintln!("{}: {}", PROGRAM, msg);
            return ExitCode::BadArgs;
        }
    };

    let options = ChannelOptions::new()
        .program(config.sed)
        .sandbox(config.sandbox);
    let mut sed = match SedChannel::spawn(&options, config.expression) {
        Ok(sed) => sed,
        Err(e) => return report(&e),
    };

    let sources = SourceList::from_args(config.files.iter().cloned());
    let result = run(&sources, &mut sed, &filter);
    // sed is reaped on every path; its status only matters if nothing else failed
    let status = sed.finish();

    match (result, status) {
        (Err(e), _) | (Ok(_), Err(e)) => report(&e),
        (Ok(_), Ok(status)) => {
            let code = ExitCode::from_engine_status(status);
            if code != ExitCode::Success {
                log::debug!("sed exited with {}", status);
            }
            code
        }
    }
}

fn run(
    sources: &SourceList,
    sed: &mut SedChannel,
    filter: &OutputFilter,
) -> tarsed::Result<TranscodeStats> {
    let stdout = BufWriter::new(io::stdout().lock());
    let sink = ArchiveSink::with_filter(stdout, filter)?;
    let (stats, mut stdout) = tarsed::transcode::run(sources, sed, sink, &mut SkipNotices)?;
    stdout.flush()?;
    Ok(stats)
}

/// Prints one diagnostic line.
fn report(error: &Error) -> ExitCode {
    eprintln!("{}: {}", error.subject().unwrap_or(PROGRAM), error);
    ExitCode::FatalError
}
