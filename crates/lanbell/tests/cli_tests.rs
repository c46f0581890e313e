//! CLI integration tests.
//!
//! These tests exercise the compiled binary's argument handling; nothing
//! here binds a socket or touches the network.

use std::process::Command;

/// Get the path to the lanbell binary.
fn binary_path() -> String {
    // In test mode, the binary might be in target/debug or target/release
    let mut path = std::env::current_exe()
        .expect("Failed to get current exe")
        .parent()
        .expect("Failed to get parent directory")
        .to_path_buf();

    // Go up from deps directory
    if path.ends_with("deps") {
        path.pop();
    }

    path.join("lanbell").to_string_lossy().to_string()
}

#[test]
fn test_help_lists_flags() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--port"));
    assert!(stdout.contains("--name"));
    assert!(stdout.contains("--discovery"));
    assert!(stdout.contains("--address"));
    assert!(stdout.contains("mDNS"));
}

#[test]
fn test_version_prints_crate_version() {
    let output = Command::new(binary_path())
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_rejects_unknown_discovery_backend() {
    let output = Command::new(binary_path())
        .args(["--discovery", "carrier-pigeon"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--discovery"));
}

#[test]
fn test_rejects_malformed_address() {
    let output = Command::new(binary_path())
        .args(["--address", "not-an-ip"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
