//! Build script for lazydevops - embeds version information.
//!
//! `BUILD_INFO_HUMAN` is the package version, followed by the output of
//! `git describe --tags --always --dirty` in parentheses when git is
//! available, followed by the rustc version. Example:
//!
//! ```text
//! 0.1.0 (v0.1.0-3-g1a2b3c4d-dirty) rustc 1.85.0 (4d91de4e4 2025-02-17)
//! ```

use std::process::Command;

fn main() {
    ["src", "build.rs", "Cargo.toml", "Cargo.lock"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    let components = [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        capture("git", &["describe", "--tags", "--always", "--dirty"]).map(|v| format!("({v})")),
        capture("rustc", &["--version"]),
    ];

    let build_info = components.into_iter().flatten().collect::<Vec<_>>().join(" ");
    println!("cargo:rustc-env=BUILD_INFO_HUMAN={build_info}");
}

/// Runs a command and returns its trimmed stdout, or None if it could not
/// be run, exited non-zero, or printed nothing.
fn capture(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
