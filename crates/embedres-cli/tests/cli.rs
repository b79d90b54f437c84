//! End-to-end tests for the `embedres` binary.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const CSS_PATH: &str = "/io/elementary/dock/Application.css";
const DOCK_BUNDLE: &[u8] = include_bytes!("../../dock-resources/resources/dock.gresource");

fn embedres(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_embedres"))
        .args(args)
        .output()
        .expect("Failed to run embedres")
}

#[test]
fn test_list_linked_bundle() {
    let output = embedres(&["list"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", CSS_PATH));
}

#[test]
fn test_extract_linked_stylesheet() {
    let output = embedres(&["extract", CSS_PATH]);
    assert!(output.status.success());
    assert_eq!(output.stdout.len(), 46);
    assert!(output.stdout.starts_with(b"window {"));
}

#[test]
fn test_details_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DOCK_BUNDLE).unwrap();
    let path = file.path().to_str().unwrap();

    let output = embedres(&["--file", path, "details", CSS_PATH, "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["size"], 46);
    assert_eq!(value["compressed"], true);
}

#[test]
fn test_children_of_root() {
    let output = embedres(&["children", "/"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "io/\n");
}

#[test]
fn test_missing_resource_fails() {
    let output = embedres(&["extract", "/io/missing"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("/io/missing"));
}

#[test]
fn test_missing_file_fails() {
    let output = embedres(&["--file", "/nonexistent/bundle.gresource", "list"]);
    assert!(!output.status.success());
}

#[test]
fn test_unload_hook_runs_once_at_exit_with_debug_logging() {
    let output = embedres(&["--debug", "list"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "status {:?}, stderr: {}", output.status, stderr);
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", CSS_PATH));
    assert_eq!(
        stderr.matches("Unregistered embedded resource bundle").count(),
        1,
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_unload_hook_is_silent_without_debug() {
    let output = embedres(&["extract", CSS_PATH]);
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Unregistered"));
}
