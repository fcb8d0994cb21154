//! End-to-end integration tests for the complete tracking flow.
//!
//! Drives the compiled binary: add entries → suggestions surface → flags
//! and listings reflect the stored state.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn chashav_binary() -> String {
    env!("CARGO_BIN_EXE_chashav").to_string()
}

/// Runs the binary against a database inside the given temp directory.
fn chashav(temp: &Path, args: &[&str]) -> Output {
    Command::new(chashav_binary())
        .env("HOME", temp)
        .env("CHASHAV_DATABASE_PATH", temp.join("chashav.db"))
        .args(args)
        .output()
        .expect("failed to run chashav")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn add_night(temp: &Path, date: &str) -> Output {
    chashav(temp, &["add", date, "night"])
}

#[test]
fn add_list_and_flags_flow() {
    let temp = TempDir::new().unwrap();

    let output = add_night(temp.path(), "5780-1-10");
    assert!(
        output.status.success(),
        "add should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout_of(&output).contains("Added entry"));

    add_night(temp.path(), "5780-2-10");
    let third = add_night(temp.path(), "5780-3-10");
    assert!(third.status.success());
    // Three entries on the same day of consecutive months form a Day of
    // Month candidate, surfaced right from the add.
    assert!(
        stdout_of(&third).contains("Possible kavuah"),
        "third add should surface a kavuah candidate: {}",
        stdout_of(&third)
    );

    let listing = chashav(temp.path(), &["list"]);
    assert!(listing.status.success());
    assert_eq!(stdout_of(&listing).lines().count(), 3);

    let json = chashav(temp.path(), &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&json)).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 3);

    let flags = chashav(temp.path(), &["flags"]);
    assert!(flags.status.success());
    // The thirtieth day after the last entry is always flagged.
    assert!(stdout_of(&flags).contains("Thirtieth Day"));
}

#[test]
fn suggest_reports_detected_candidates() {
    let temp = TempDir::new().unwrap();
    add_night(temp.path(), "5780-1-5");
    add_night(temp.path(), "5780-3-5");
    add_night(temp.path(), "5780-5-5");

    let suggest = chashav(temp.path(), &["kavuahs", "suggest"]);
    assert!(suggest.status.success());
    assert!(
        stdout_of(&suggest).contains("every 2nd month"),
        "alternating-month entries should suggest a sirug kavuah: {}",
        stdout_of(&suggest)
    );
}

#[test]
fn duplicate_add_fails() {
    let temp = TempDir::new().unwrap();
    assert!(add_night(temp.path(), "5780-1-10").status.success());
    let again = add_night(temp.path(), "5780-1-10");
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("already exists"));
}

#[test]
fn remove_by_index() {
    let temp = TempDir::new().unwrap();
    add_night(temp.path(), "5780-1-10");
    add_night(temp.path(), "5780-2-12");

    let removed = chashav(temp.path(), &["remove", "0"]);
    assert!(removed.status.success());
    assert!(stdout_of(&removed).contains("Removed entry"));

    let listing = chashav(temp.path(), &["list"]);
    assert_eq!(stdout_of(&listing).lines().count(), 1);

    let out_of_range = chashav(temp.path(), &["remove", "7"]);
    assert!(!out_of_range.status.success());
}

#[test]
fn empty_database_reports_cleanly() {
    let temp = TempDir::new().unwrap();
    assert!(stdout_of(&chashav(temp.path(), &["list"])).contains("No entries"));
    assert!(stdout_of(&chashav(temp.path(), &["flags"])).contains("No flagged dates"));
    assert!(stdout_of(&chashav(temp.path(), &["kavuahs", "list"])).contains("No kavuahs"));
}

#[test]
fn secular_dates_are_converted() {
    let temp = TempDir::new().unwrap();
    // 2020-03-26 is Nissan 1, 5780.
    let output = chashav(temp.path(), &["add", "2020-3-26", "night", "--secular"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Nissan 1, 5780"));
}
