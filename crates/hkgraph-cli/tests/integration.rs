//! Integration tests for hkgraph-cli.
//!
//! Runs the `hkgraph` binary end to end: id tools, registry listing and
//! payload runs through chains, with and without a config file.

use std::process::{Command, Output};

fn hkgraph_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hkgraph"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_ok(args: &[&str]) -> String {
    let output: Output = hkgraph_bin()
        .args(args)
        .output()
        .expect("failed to run hkgraph");
    assert!(
        output.status.success(),
        "hkgraph {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// ids / parse
// ---------------------------------------------------------------------------

#[test]
fn ids_seeded_output_is_reproducible() {
    let first = run_ok(&["ids", "--count", "3", "--seed", "7"]);
    let second = run_ok(&["ids", "--count", "3", "--seed", "7"]);
    assert_eq!(first, second);
    let lines: Vec<&str> = first.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.len() == 36));
}

#[test]
fn parse_canonicalizes() {
    let stdout = run_ok(&["parse", "{67E55044-10B1-426F-9247-BB680E5FE0C8}"]);
    assert!(stdout.contains("canonical: 67e55044-10b1-426f-9247-bb680e5fe0c8"));
    assert!(stdout.contains("bytes:     67e5504410b1426f9247bb680e5fe0c8"));
}

#[test]
fn parse_rejects_garbage() {
    let output = hkgraph_bin()
        .args(["parse", "not-an-id"])
        .output()
        .expect("failed to run hkgraph");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not an identifier"), "got: {stderr}");
}

// ---------------------------------------------------------------------------
// processors
// ---------------------------------------------------------------------------

#[test]
fn processors_lists_builtins() {
    let stdout = run_ok(&["processors"]);
    assert!(stdout.contains("Available Processors"));
    for tag in ["midi-in", "midi-out", "passthrough"] {
        assert!(stdout.contains(tag), "listing should contain '{tag}'");
    }
}

#[test]
fn processors_detail() {
    let stdout = run_ok(&["processors", "midi-out"]);
    assert!(stdout.contains("MIDI Out"));
    assert!(stdout.contains("sticky:   true"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), contents).expect("write config");
    file
}

#[test]
fn run_passes_payload_through_chain() {
    let config = config_file("dispatch = \"inline\"\n");
    let path = config.path().to_str().unwrap();
    let stdout = run_ok(&[
        "run",
        "--chain",
        "passthrough,passthrough",
        "--payload",
        "42",
        "--config",
        path,
    ]);
    assert!(stdout.contains("output: [42]"), "got: {stdout}");
    assert!(stdout.contains("nodes: 4"), "got: {stdout}");
    assert!(stdout.contains("edges: 3"), "got: {stdout}");
    assert!(stdout.contains("mode: inline"), "got: {stdout}");
}

#[test]
fn run_in_worker_mode() {
    let config = config_file("");
    let path = config.path().to_str().unwrap();
    let stdout = run_ok(&["run", "--mode", "worker", "--payload", "-5", "--config", path]);
    assert!(stdout.contains("output: [-5]"), "got: {stdout}");
    assert!(stdout.contains("mode: worker"), "got: {stdout}");
}

#[test]
fn run_with_muted_node_yields_nothing() {
    let config = config_file("");
    let path = config.path().to_str().unwrap();
    let stdout = run_ok(&[
        "run", "--chain", "passthrough,passthrough", "--mute", "1", "--config", path,
    ]);
    assert!(stdout.contains("output: []"), "got: {stdout}");
}

#[test]
fn run_rejects_unknown_processor() {
    let config = config_file("");
    let output = hkgraph_bin()
        .args(["run", "--chain", "keyboard", "--config"])
        .arg(config.path())
        .output()
        .expect("failed to run hkgraph");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown processor: keyboard"));
}

#[test]
fn run_rejects_bad_config() {
    let config = config_file("dispatch = \"sometimes\"\n");
    let output = hkgraph_bin()
        .args(["run", "--config"])
        .arg(config.path())
        .output()
        .expect("failed to run hkgraph");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("loading config"));
}

#[test]
fn run_rejects_nul_worker_name() {
    let config = config_file("worker_thread_name = \"x\\u0000y\"\n");
    let output = hkgraph_bin()
        .args(["run", "--config"])
        .arg(config.path())
        .output()
        .expect("failed to run hkgraph");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loading config"), "{stderr}");
    assert!(stderr.contains("worker_thread_name"), "{stderr}");
}
