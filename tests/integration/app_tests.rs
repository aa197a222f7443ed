use clap::Parser;
use dupfind::cli::Cli;
use dupfind::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

// An empty config file keeps the user's own settings out of the run.
fn empty_config() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

fn cli(config: &Path, extra: &[&str]) -> Cli {
    let config = config.join("config.toml");
    let mut args = vec![
        "dupfind",
        "--no-progress",
        "-q",
        "--config",
        config.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_exit_code_success_with_duplicates() {
    let config = empty_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    let cli = cli(config.path(), &["-s", "0", dir.path().to_str().unwrap()]);
    let result = dupfind::run_app(cli).unwrap();

    assert_eq!(result, ExitCode::Success);
}

#[test]
fn test_exit_code_success_without_duplicates() {
    let config = empty_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("unique.txt"), b"unique").unwrap();

    let cli = cli(config.path(), &["-s", "0", dir.path().to_str().unwrap()]);
    let result = dupfind::run_app(cli).unwrap();

    assert_eq!(result, ExitCode::Success);
}

#[test]
fn test_exit_code_success_with_json_output() {
    let config = empty_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"same").unwrap();
    fs::write(dir.path().join("b.bin"), b"same").unwrap();

    let cli = cli(
        config.path(),
        &["-s", "0", "-o", "json", dir.path().to_str().unwrap()],
    );
    let result = dupfind::run_app(cli).unwrap();

    assert_eq!(result, ExitCode::Success);
}

#[test]
fn test_exit_code_invalid_path() {
    let config = empty_config();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let cli = cli(
        config.path(),
        &[dir.path().to_str().unwrap(), missing.to_str().unwrap()],
    );
    let err = dupfind::run_app(cli).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidPath);
    assert!(err
        .to_string()
        .ends_with("does-not-exist is not a valid path, please verify"));
}

#[test]
fn test_missing_config_file_is_general_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "dupfind",
        "--no-progress",
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = dupfind::run_app(cli).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}
