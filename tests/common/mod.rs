//! Shared test utilities for integration tests.
//!
//! Archive creation and inspection helpers are consolidated here to avoid
//! duplication.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::ffi::OsStr;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::Command;

use tarsed::progress::RecordingObserver;
use tarsed::{ArchiveSink, ArchiveSource, Renamer, TranscodeStats, Transcoder};

/// Fixed modification time used by the archive builders.
pub const MTIME: u64 = 1_700_000_000;

/// Creates an in-memory tar archive of regular files.
///
/// Long names are stored the way `tar::Builder` does it, with GNU long name
/// records.
pub fn create_tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(MTIME);
        builder
            .append_data(&mut header, name, *data)
            .expect("Failed to append entry");
    }
    builder.into_inner().expect("Failed to finish archive")
}

/// Creates a one-entry archive holding a GNU sparse file (type `S`) with a
/// single data chunk of `chunk` at `offset`.
pub fn create_gnu_sparse_tar(name: &str, offset: u64, chunk: &[u8]) -> Vec<u8> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::GNUSparse);
    header.set_path(name).expect("Failed to set path");
    header.set_size(chunk.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(MTIME);
    let gnu = header.as_gnu_mut().expect("GNU header");
    octal_field(&mut gnu.sparse[0].offset, offset);
    octal_field(&mut gnu.sparse[0].numbytes, chunk.len() as u64);
    octal_field(&mut gnu.realsize, offset + chunk.len() as u64);
    header.set_cksum();

    let mut bytes = header.as_bytes().to_vec();
    bytes.extend_from_slice(chunk);
    pad_to_block(&mut bytes);
    bytes.extend([0u8; 1024]);
    bytes
}

/// Creates a one-entry archive holding a pax 1.0 sparse file, the layout GNU
/// tar writes with `--sparse --format=posix`.
pub fn create_pax_sparse_tar(name: &str, offset: u64, chunk: &[u8]) -> Vec<u8> {
    let realsize = (offset + chunk.len() as u64).to_string();
    let mut builder = tar::Builder::new(Vec::new());
    builder
        .append_pax_extensions([
            ("GNU.sparse.major", &b"1"[..]),
            ("GNU.sparse.minor", &b"0"[..]),
            ("GNU.sparse.name", name.as_bytes()),
            ("GNU.sparse.realsize", realsize.as_bytes()),
        ])
        .expect("Failed to append pax header");

    let mut data = format!("1\n{}\n{}\n", offset, chunk.len()).into_bytes();
    pad_to_block(&mut data);
    data.extend_from_slice(chunk);
    let base = name.rsplit('/').next().unwrap_or(name);
    let mut header = tar::Header::new_ustar();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(MTIME);
    builder
        .append_data(&mut header, format!("GNUSparseFile.42/{}", base), data.as_slice())
        .expect("Failed to append entry");
    builder.into_inner().expect("Failed to finish archive")
}

fn octal_field(field: &mut [u8], value: u64) {
    let digits = field.len() - 1;
    let text = format!("{:0width$o}", value, width = digits);
    field[..digits].copy_from_slice(text.as_bytes());
    field[digits] = 0;
}

fn pad_to_block(bytes: &mut Vec<u8>) {
    let padded = bytes.len().div_ceil(512) * 512;
    bytes.resize(padded, 0);
}

/// Blanks the mode, uid, gid and mtime fields of the first header and
/// recomputes its checksum.
pub fn blank_numeric_fields(archive: &mut [u8]) {
    for range in [100..108, 108..116, 116..124, 136..148] {
        archive[range].fill(0);
    }
    archive[148..156].fill(b' ');
    let sum: u32 = archive[..512].iter().map(|&b| u32::from(b)).sum();
    archive[148..156].copy_from_slice(format!("{:06o}\0 ", sum).as_bytes());
}

/// Writes a 1 MiB hole followed by `tail`.
pub fn write_sparse_file(path: &Path, tail: &[u8]) {
    let mut file = std::fs::File::create(path).expect("Failed to create sparse file");
    file.set_len(1 << 20).expect("Failed to extend sparse file");
    file.seek(SeekFrom::End(0)).expect("Failed to seek");
    file.write_all(tail).expect("Failed to write sparse file");
}

/// A parsed output entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEntry {
    pub path: Vec<u8>,
    pub kind: tar::EntryType,
    pub size: u64,
    pub data: Vec<u8>,
    pub link_target: Option<Vec<u8>>,
    pub pax_records: Vec<(String, Vec<u8>)>,
}

impl ReadEntry {
    /// The pathname as a string, for assertions.
    pub fn path_str(&self) -> &str {
        std::str::from_utf8(&self.path).expect("non-UTF-8 path in test archive")
    }

    /// The value of a pax record of this entry.
    pub fn pax_value(&self, key: &str) -> Option<&[u8]> {
        self.pax_records
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_slice())
    }
}

/// Reads every entry of an uncompressed tar archive.
pub fn read_tar(bytes: &[u8]) -> Vec<ReadEntry> {
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    archive
        .entries()
        .expect("Failed to read archive")
        .map(|entry| {
            let mut entry = entry.expect("Failed to read entry");
            let path = entry.path_bytes().into_owned();
            let link_target = entry.link_name_bytes().map(|l| l.into_owned());
            let kind = entry.header().entry_type();
            let size = entry.size();
            let pax_records = entry
                .pax_extensions()
                .expect("Failed to read pax header")
                .map(|extensions| {
                    extensions
                        .map(|ext| {
                            let ext = ext.expect("Malformed pax record");
                            let key = ext.key().expect("Non-UTF-8 pax key").to_string();
                            (key, ext.value_bytes().to_vec())
                        })
                        .collect()
                })
                .unwrap_or_default();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).expect("Failed to read data");
            ReadEntry {
                path,
                kind,
                size,
                data,
                link_target,
                pax_records,
            }
        })
        .collect()
}

/// Names of the entries of an uncompressed tar archive.
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    read_tar(bytes)
        .iter()
        .map(|entry| entry.path_str().to_string())
        .collect()
}

/// Outcome of an in-memory transcoding run.
pub struct Transcoded {
    pub stats: TranscodeStats,
    pub output: Vec<u8>,
    pub observer: RecordingObserver,
}

/// Transcodes in-memory inputs, in order, into an in-memory tar archive.
pub fn transcode<N: Renamer>(inputs: &[Vec<u8>], renamer: N) -> tarsed::Result<Transcoded> {
    let sink = ArchiveSink::new(Vec::new())?;
    let mut transcoder = Transcoder::new(renamer, sink);
    let mut observer = RecordingObserver::default();
    for (i, input) in inputs.iter().enumerate() {
        let mut source = ArchiveSource::open(Cursor::new(input.clone()), format!("input{}", i))?;
        transcoder.transcode_source(&mut source, &mut observer)?;
    }
    let (stats, output) = transcoder.finish()?;
    Ok(Transcoded {
        stats,
        output,
        observer,
    })
}

/// Returns `true` if `sed` on `PATH` is GNU sed.
///
/// Tests that drive a real engine call this first and return early otherwise.
pub fn gnu_sed_available() -> bool {
    Command::new("sed")
        .arg("--version")
        .output()
        .map(|out| out.status.success() && String::from_utf8_lossy(&out.stdout).contains("GNU"))
        .unwrap_or(false)
}

/// Returns `true` if `tar` on `PATH` is GNU tar.
pub fn gnu_tar_available() -> bool {
    reports_version("tar", "GNU tar")
}

/// Returns `true` if `bsdtar` is on `PATH`.
pub fn bsdtar_available() -> bool {
    reports_version("bsdtar", "bsdtar")
}

fn reports_version(program: &str, marker: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|out| out.status.success() && String::from_utf8_lossy(&out.stdout).contains(marker))
        .unwrap_or(false)
}

/// Runs a system archiver to completion and returns its standard output.
pub fn run_archiver<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Vec<u8> {
    let output = Command::new(program)
        .args(args)
        .output()
        .expect("Failed to run archiver");
    assert!(
        output.status.success(),
        "{} failed: {}",
        program,
        String::from_utf8_lossy(&output.stderr)
    );
    output.stdout
}

/// Lists an archive file with a system archiver.
pub fn list_with(program: &str, archive: &Path) -> Vec<String> {
    let listing = run_archiver(program, &[OsStr::new("-tf"), archive.as_os_str()]);
    String::from_utf8_lossy(&listing)
        .lines()
        .map(str::to_string)
        .collect()
}
