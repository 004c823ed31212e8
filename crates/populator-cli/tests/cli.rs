use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn populator(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_populator"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run populator")
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

fn count_files(root: &Path) -> usize {
    files_under(root).len()
}

#[test]
fn generate_creates_files_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("share");
    let report = dir.path().join("run.json");

    let output = populator(&[
        "generate",
        out.to_str().expect("utf-8 path"),
        "40",
        "--seed",
        "7",
        "--quiet",
        "--report",
        report.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert_eq!(count_files(&out), 40);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(value["total"], 40);
    assert_eq!(value["successful"], 40);
    assert_eq!(value["seed"], 7);
}

#[test]
fn failed_files_exit_with_one_and_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("first");
    let first_run = populator(&[
        "generate",
        first.to_str().expect("utf-8 path"),
        "20",
        "--seed",
        "31",
        "--quiet",
        "--no-timestamps",
    ]);
    assert_eq!(first_run.status.code(), Some(0), "{first_run:?}");

    // Same seed, same plan: occupy one planned file path with a directory.
    let planned = files_under(&first).into_iter().next().expect("a generated file");
    let relative = planned.strip_prefix(&first).expect("under base");
    let second = dir.path().join("second");
    let blocked = second.join(relative);
    std::fs::create_dir_all(&blocked).expect("block path");

    let report = dir.path().join("run.json");
    let output = populator(&[
        "generate",
        second.to_str().expect("utf-8 path"),
        "20",
        "--seed",
        "31",
        "--no-timestamps",
        "--report",
        report.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(1), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Errors:"));
    assert!(stdout.contains(&blocked.display().to_string()));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(value["successful"], 19);
    assert_eq!(value["failed"], 1);
    let failures = value["failures"].as_array().expect("failures");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["path"], blocked.to_str().expect("utf-8 path"));
}

#[test]
fn preview_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("planned");

    let output = populator(&[
        "generate",
        out.to_str().expect("utf-8 path"),
        "25",
        "--preview",
        "--depth",
        "1",
    ]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Directory structure:"));
    assert!(stdout.contains("Files by extension:"));
    assert!(stdout.contains("Files by category:"));
    assert!(!out.exists());
}

#[test]
fn invalid_arguments_exit_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("never");
    let out = out.to_str().expect("utf-8 path");

    for args in [
        vec!["generate", out, "0"],
        vec!["generate", out, "10001"],
        vec!["generate", out, "10", "--depth", "4"],
        vec!["generate", out, "10", "--concurrency", "0"],
    ] {
        let output = populator(&args);
        assert_eq!(output.status.code(), Some(2), "{args:?}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    }
    assert!(!Path::new(out).exists());
}

#[test]
fn file_base_path_is_a_configuration_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("taken.txt");
    std::fs::write(&file, b"x").expect("write");

    let output = populator(&["generate", file.to_str().expect("utf-8 path"), "5", "--quiet"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a directory"));
}

#[test]
fn config_file_supplies_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("populator.toml");
    std::fs::write(&config, "depth = 1\nseed = 11\ntimestamps = false\n").expect("write");
    let out = dir.path().join("flat");

    let output = populator(&[
        "generate",
        out.to_str().expect("utf-8 path"),
        "12",
        "--quiet",
        "--config",
        config.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    for entry in std::fs::read_dir(&out).expect("read base") {
        let category = entry.expect("entry").path();
        assert!(category.is_dir());
        for child in std::fs::read_dir(&category).expect("read category") {
            assert!(child.expect("entry").path().is_file());
        }
    }
}

#[test]
fn log_file_receives_json_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("logged");
    let log = dir.path().join("populator.log");

    let output = populator(&[
        "generate",
        out.to_str().expect("utf-8 path"),
        "5",
        "--quiet",
        "--verbose",
        "--log-file",
        log.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    let content = std::fs::read_to_string(&log).expect("log file");
    assert!(content.lines().count() >= 2);
    for line in content.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("json log line");
        assert!(value["timestamp"].is_string());
    }
}

#[test]
fn platform_info_prints_limits() {
    let output = populator(&["platform-info"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Max filename length:"));
    assert!(stdout.contains("Filename sanitization:"));
}
