// Drives the compiled binary through a PTY, exercising the real event loop
// and crossterm input handling.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test pty_session -- --ignored`.

#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use assert_cmd::prelude::*;
use expectrl::{spawn, Eof};

fn unitdrill(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("unitdrill"));
    // keep config and logs out of the real home directory
    cmd.env("HOME", home);
    cmd
}

#[test]
#[ignore]
fn session_can_be_answered_finished_and_quit() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("unitdrill");
    let cmd = format!(
        "env HOME={} {} -c length -u m,km -q 1",
        home.path().display(),
        bin.display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // an unreadable answer keeps the session going
    p.send("abc\r")?;
    std::thread::sleep(Duration::from_millis(100));

    // ctrl+f finishes, esc leaves the results screen
    p.send("\x06")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
fn refuses_to_run_without_a_tty() {
    let home = tempfile::tempdir().unwrap();
    let output = unitdrill(home.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("stdin must be a tty"));
}

#[test]
fn rejects_out_of_range_arguments() {
    let home = tempfile::tempdir().unwrap();
    unitdrill(home.path())
        .args(["--questions", "500"])
        .assert()
        .failure();
    unitdrill(home.path())
        .args(["--difficulty", "impossible"])
        .assert()
        .failure();
}
