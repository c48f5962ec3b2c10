// tests/config_loading.rs

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use pgsh::config::{load_and_validate, load_or_default};
use pgsh::errors::PgshError;
use pgsh::fs::RealFileSystem;
use pgsh::types::{ExecMode, ScannerKind};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = write_config(
        r#"
[exec]
interpreter = "/bin/sh"
tmp_dir = "/var/tmp/pgsh"
mode = "concurrent"
default_timeout_seconds = 15

[scanner]
kind = "persist"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.exec.interpreter, "/bin/sh");
    assert_eq!(cfg.exec.tmp_dir, Path::new("/var/tmp/pgsh"));
    assert_eq!(cfg.exec.mode, ExecMode::Concurrent);
    assert_eq!(cfg.exec.default_timeout_seconds, 15);
    assert_eq!(cfg.scanner.kind, ScannerKind::Persist);
}

#[test]
fn empty_file_gives_defaults() {
    let file = write_config("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.exec.interpreter, "/bin/bash");
    assert_eq!(cfg.exec.tmp_dir, Path::new("tmp"));
    assert_eq!(cfg.exec.mode, ExecMode::Sequential);
    assert_eq!(cfg.exec.default_timeout_seconds, 0);
    assert_eq!(cfg.scanner.kind, ScannerKind::Log);
}

#[test]
fn empty_interpreter_is_rejected() {
    let file = write_config("[exec]\ninterpreter = \"  \"\n");

    let err = load_and_validate(file.path()).unwrap_err();

    assert!(matches!(err, PgshError::ConfigError(msg) if msg.contains("interpreter")));
}

#[test]
fn unknown_mode_is_a_toml_error() {
    let file = write_config("[exec]\nmode = \"parallel\"\n");

    let err = load_and_validate(file.path()).unwrap_err();

    assert!(matches!(err, PgshError::TomlError(_)));
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_or_default(&RealFileSystem, Some(&missing)).unwrap_err();

    assert!(matches!(err, PgshError::ConfigError(msg) if msg.contains("does not exist")));
}
