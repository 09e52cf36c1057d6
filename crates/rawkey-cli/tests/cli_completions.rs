//! Tests for shell completion generation.
// Test module - relaxed lint rules
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

use std::process::Command;

fn rawkey_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rawkey"))
}

fn completions(shell: &str) -> String {
    let output = rawkey_bin()
        .arg("completions")
        .arg(shell)
        .output()
        .expect("failed to execute");

    assert!(
        output.status.success(),
        "completions {shell} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn bash_completions_name_the_binary() {
    let stdout = completions("bash");
    assert!(stdout.contains("_rawkey"), "bash completions should contain function name");
    assert!(stdout.contains("complete"));
}

#[test]
fn zsh_completions_start_with_compdef() {
    assert!(completions("zsh").contains("#compdef"));
}

#[test]
fn fish_completions_list_subcommands() {
    let stdout = completions("fish");
    assert!(stdout.contains("complete -c rawkey"));
    assert!(stdout.contains("decode"));
}

#[test]
fn unknown_shell_is_rejected() {
    let output = rawkey_bin()
        .arg("completions")
        .arg("not-a-shell")
        .output()
        .expect("failed to execute");

    assert!(!output.status.success());
}
