//! Output compression selection and skip notices.

use std::path::PathBuf;

use tarsed::format::detect::filter_from_file_name;
use tarsed::{CompressionFilter, Entry, OutputFilter, TranscodeObserver};

use crate::Compress;

/// Where the kernel says standard output points.
const STDOUT_LINK: &str = "/proc/self/fd/1";

/// Resolves the `--compress` choice to an output filter.
pub fn output_filter(compress: Compress) -> Result<OutputFilter, String> {
    let filter = match compress {
        Compress::Auto => return Ok(auto_filter(stdout_target())),
        Compress::None => CompressionFilter::None,
        Compress::Gzip => CompressionFilter::Gzip,
        Compress::Bzip2 => CompressionFilter::Bzip2,
        Compress::Zstd => CompressionFilter::Zstd,
    };
    OutputFilter::for_filter(filter)
        .ok_or_else(|| format!("{} output is not supported by this build", filter))
}

fn stdout_target() -> Option<PathBuf> {
    std::fs::read_link(STDOUT_LINK).ok()
}

/// Mirrors the extension of the file standard output is redirected to.
///
/// Pipes, terminals and unknown extensions get plain tar.
fn auto_filter(target: Option<PathBuf>) -> OutputFilter {
    let filter = target
        .as_deref()
        .and_then(|path| path.file_name())
        .map(|name| filter_from_file_name(&name.to_string_lossy()))
        .unwrap_or(CompressionFilter::None);
    log::debug!("standard output is {:?}, using {} output", target, filter);
    OutputFilter::for_filter(filter).unwrap_or_default()
}

/// Prints one line per dropped entry.
pub struct SkipNotices;

impl TranscodeObserver for SkipNotices {
    fn on_skip(&mut self, original: &Entry) {
        eprintln!(
            "{}: empty filename after substitution; skipping",
            original.display_path()
        );
    }
}
