//! CLI integration tests.
//!
//! These tests run the built binary as a subprocess. Tests that need a
//! working substitution engine return early when GNU sed is not on `PATH`.

#![cfg(feature = "cli")]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

mod common;

use common::{
    create_tar, entry_names, gnu_sed_available, gnu_tar_available, list_with, read_tar,
    run_archiver, write_sparse_file,
};

fn tarsed() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tarsed"));
    command.env_remove("TARSED_SED").env_remove("RUST_LOG");
    command
}

/// Runs the binary with `stdin` as standard input and captures the rest.
fn run(command: &mut Command, stdin: &[u8]) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start tarsed");
    let mut pipe = child.stdin.take().unwrap();
    // Errors here mean tarsed stopped reading, which some tests expect.
    let _ = pipe.write_all(stdin);
    drop(pipe);
    child.wait_with_output().expect("Failed to wait for tarsed")
}

fn stderr_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(str::to_string)
        .collect()
}

fn write_archive(dir: &Path, name: &str, entries: &[(&str, &[u8])]) {
    std::fs::write(dir.join(name), create_tar(entries)).unwrap();
}

// =============================================================================
// Renaming
// =============================================================================

#[test]
fn test_rename_stdin() {
    if !gnu_sed_available() {
        return;
    }
    let input = create_tar(&[("old/a.txt", b"alpha"), ("old/b.txt", b"beta")]);
    let output = run(tarsed().arg("s/old/new/"), &input);

    assert!(output.status.success(), "{:?}", stderr_lines(&output));
    assert_eq!(entry_names(&output.stdout), ["new/a.txt", "new/b.txt"]);
    assert_eq!(read_tar(&output.stdout)[1].data, b"beta");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_delete_all_reports_each_skip() {
    if !gnu_sed_available() {
        return;
    }
    let input = create_tar(&[("a", b"1"), ("b", b"2")]);
    let output = run(tarsed().arg("s/.*//"), &input);

    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0u8; 1024]);
    assert_eq!(
        stderr_lines(&output),
        [
            "a: empty filename after substitution; skipping",
            "b: empty filename after substitution; skipping",
        ]
    );
}

#[test]
fn test_files_are_concatenated_in_order() {
    if !gnu_sed_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path(), "one.tar", &[("x", b"1")]);
    write_archive(dir.path(), "two.tar", &[("y", b"2"), ("z", b"3")]);

    let output = run(
        tarsed()
            .current_dir(dir.path())
            .args(["s/^/p\\//", "one.tar", "two.tar"]),
        b"",
    );

    assert!(output.status.success(), "{:?}", stderr_lines(&output));
    assert_eq!(entry_names(&output.stdout), ["p/x", "p/y", "p/z"]);
}

#[test]
fn test_lone_dash_reads_stdin() {
    if !gnu_sed_available() {
        return;
    }
    let input = create_tar(&[("from-stdin", b"")]);
    let output = run(tarsed().args(["s/-/_/g", "-"]), &input);

    assert!(output.status.success());
    assert_eq!(entry_names(&output.stdout), ["from_stdin"]);
}

#[test]
fn test_dash_among_files_is_a_file_name() {
    if !gnu_sed_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path(), "a.tar", &[("first", b"")]);
    write_archive(dir.path(), "-", &[("second", b"")]);
    let stdin = create_tar(&[("never-read", b"")]);

    let output = run(
        tarsed().current_dir(dir.path()).args(["s/^//", "a.tar", "-"]),
        &stdin,
    );

    assert!(output.status.success(), "{:?}", stderr_lines(&output));
    assert_eq!(entry_names(&output.stdout), ["first", "second"]);
}

#[test]
fn test_gnu_tar_sparse_archive_is_renamed() {
    if !gnu_sed_available() || !gnu_tar_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_sparse_file(&dir.path().join("sp"), b"data");
    let tree = dir.path().to_str().unwrap();
    for (name, format) in [("psparse.tar", "--format=posix"), ("gsparse.tar", "--format=gnu")] {
        let archive = dir.path().join(name);
        run_archiver(
            "tar",
            &["-C", tree, "--sparse", format, "-cf", archive.to_str().unwrap(), "sp"],
        );
    }

    for name in ["psparse.tar", "gsparse.tar"] {
        let output = run(
            tarsed().current_dir(dir.path()).args(["s/sp/renamed/", name]),
            b"",
        );
        assert!(output.status.success(), "{}: {:?}", name, stderr_lines(&output));
        let renamed = dir.path().join("out.tar");
        std::fs::write(&renamed, &output.stdout).unwrap();
        assert_eq!(list_with("tar", &renamed), ["renamed"], "{}", name);
    }
}

// =============================================================================
// Output compression
// =============================================================================

#[cfg(feature = "deflate")]
#[test]
fn test_compress_gzip() {
    if !gnu_sed_available() {
        return;
    }
    let input = create_tar(&[("a.txt", b"hello")]);
    let output = run(tarsed().args(["--compress", "gzip", "s/a/b/"]), &input);

    assert!(output.status.success());
    assert_eq!(&output.stdout[..2], &[0x1f, 0x8b]);

    let mut tar = Vec::new();
    std::io::Read::read_to_end(
        &mut flate2::read::MultiGzDecoder::new(output.stdout.as_slice()),
        &mut tar,
    )
    .unwrap();
    assert_eq!(entry_names(&tar), ["b.txt"]);
}

#[cfg(all(target_os = "linux", feature = "deflate"))]
#[test]
fn test_redirect_to_tgz_compresses() {
    if !gnu_sed_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.tgz");
    let stdout = std::fs::File::create(&target).unwrap();

    let mut child = tarsed()
        .arg("s/x/y/")
        .stdin(Stdio::piped())
        .stdout(stdout)
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let mut pipe = child.stdin.take().unwrap();
    pipe.write_all(&create_tar(&[("x", b"data")])).unwrap();
    drop(pipe);
    assert!(child.wait_with_output().unwrap().status.success());

    let written = std::fs::read(&target).unwrap();
    assert_eq!(&written[..2], &[0x1f, 0x8b]);
}

#[test]
fn test_pipe_output_is_plain_tar() {
    if !gnu_sed_available() {
        return;
    }
    let input = create_tar(&[("a", b"")]);
    let output = run(tarsed().arg("s/^//"), &input);

    assert!(output.status.success());
    assert_eq!(entry_names(&output.stdout), ["a"]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_no_arguments_is_usage_error() {
    let output = run(&mut tarsed(), b"");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_help_exits_zero() {
    let output = run(tarsed().arg("--help"), b"");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn test_garbage_input_fails() {
    if !gnu_sed_available() {
        return;
    }
    let output = run(tarsed().arg("s/a/b/"), &[0x55; 2048]);

    assert!(!output.status.success());
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].starts_with("STDIN: "), "{:?}", lines);
}

#[test]
fn test_missing_input_file_fails() {
    if !gnu_sed_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        tarsed().current_dir(dir.path()).args(["s/^//", "missing.tar"]),
        b"",
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_lines(&output)[0].starts_with("missing.tar: "));
}

#[test]
fn test_missing_sed_program_fails() {
    let input = create_tar(&[("a", b"")]);
    let output = run(
        tarsed().args(["--sed", "/nonexistent/sed", "s/a/b/"]),
        &input,
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("tarsed: failed to start"), "{}", stderr);
}

#[test]
fn test_invalid_expression_exit_status() {
    if !gnu_sed_available() {
        return;
    }
    // With no entries nothing is renamed; the exit status comes from sed.
    let output = run(tarsed().arg("s/unterminated"), b"");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.len() <= 1024);
}
