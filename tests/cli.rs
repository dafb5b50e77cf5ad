//! End-to-end checks of the binary's exit behavior.

use std::process::{Command, Output};

fn run(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mcp-proxy"));
    cmd.args(args).env("NO_COLOR", "1");
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.output().expect("failed to run mcp-proxy")
}

#[test]
fn non_numeric_port_exits_with_panel() {
    let output = run(
        &["--port", "abc"],
        &[("MCP_UPSTREAM_URL", "http://127.0.0.1:9/sse")],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("MCP Proxy Server"));
    assert!(stdout.contains("Looking for .env at:"));
    assert!(stderr.contains("Failed to start server:"));
    assert!(stderr.lines().any(|line| line
        .contains("Invalid port: NaN (expected an integer between 0 and 65535)")));
}

#[test]
fn missing_upstream_exits_with_panel() {
    // An empty value counts as set, so a local .env cannot fill it in.
    let output = run(&["-p", "0"], &[("MCP_UPSTREAM_URL", "")]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MCP_UPSTREAM_URL is not set"));
}

#[test]
fn unknown_flag_is_usage_error() {
    let output = run(&["--bogus"], &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn help_lists_port() {
    let output = run(&["--help"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--port"));
}
