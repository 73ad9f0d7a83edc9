//! CLI tool for renaming tar archive entries with sed.

mod commands;
mod exit_codes;
mod output;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Rename the entries of tar archives with a sed expression
#[derive(Parser)]
#[command(name = "tarsed")]
#[command(
    author,
    version,
    about = "Rename the entries of tar archives with a sed expression",
    long_about = "Rename the entries of tar archives with a sed expression.\n\n\
        Every entry pathname is passed through sed as a NUL-terminated record \
        and the archive is written to standard output under the new names. \
        Entries renamed to the empty string are dropped."
)]
pub struct Cli {
    /// sed expression applied to every entry pathname
    expression: OsString,

    /// Input archives; standard input if none are given, or a lone "-"
    files: Vec<OsString>,

    /// sed program to run
    #[arg(long = "sed", value_name = "PATH", env = "TARSED_SED", default_value = "sed")]
    sed: PathBuf,

    /// Allow the sed commands that run programs or touch files (e, r, w)
    #[arg(long)]
    no_sandbox: bool,

    /// Output compression; "auto" follows the extension of the file standard output is redirected to
    #[arg(long, value_enum, default_value = "auto")]
    compress: Compress,

    /// Log every renamed entry to standard error
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Compress {
    Auto,
    None,
    Gzip,
    Bzip2,
    Zstd,
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .format_level(false)
        .format_target(false)
        .filter_level(log::LevelFilter::Warn);
    if verbose {
        builder.filter_module("tarsed", log::LevelFilter::Debug);
    }
    builder.parse_env("RUST_LOG");
    builder.init();
}

fn main() {
    // Usage errors exit with clap's code 2, help and version with 0
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = commands::transcode(&commands::TranscodeConfig {
        expression: &cli.expression,
        files: &cli.files,
        sed: &cli.sed,
        sandbox: !cli.no_sandbox,
        compress: cli.compress,
    });

    std::process::exit(exit_code.code());
}
