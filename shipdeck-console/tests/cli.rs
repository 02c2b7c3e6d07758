// Integration tests for the shipdeck console against the demo fleet fixture.
// Run with: cargo test -p shipdeck-console --test cli

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/fleet.json")
}

/// Runs the console with a scratch home so logs and preferences stay out of
/// the user's directories.
fn shipdeck(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shipdeck-console"))
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("SHIPDECK_FIXTURE")
        .arg("--fixture")
        .arg(fixture())
        .arg("--no-preferences")
        .args(args)
        .output()
        .expect("run shipdeck-console")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_prints_every_row() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &[]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.starts_with("5 rows"), "header: {out}");
    assert!(out.contains("Booking"));
    assert!(out.contains("MSC123456"));
}

#[test]
fn carrier_filter_includes_shared_vessels() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &["--filter", "naviera=MSC"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.starts_with("3 rows"), "header: {out}");
    // booked with ONE on a vessel MSC operates
    assert!(out.contains("ONE778812"));
    assert!(!out.contains("HLC556677"));
}

#[test]
fn malformed_filter_fails() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &["--filter", "naviera"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid filter"));
}

// ---------------------------------------------------------------------------
// edit / bulk
// ---------------------------------------------------------------------------

#[test]
fn edit_saves_one_cell() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &["edit", "r1", "comentario", "Revisar sellos"]);
    assert_success(&output);
    assert!(stdout(&output).contains("r1.comentario = Revisar sellos"));
}

#[test]
fn edit_on_a_selected_row_applies_to_the_selection() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(
        &home,
        &["edit", "r1", "comentario", "Urgente", "--select", "r1", "--select", "r4"],
    );
    assert_success(&output);
    assert!(stdout(&output).contains("comentario: 2 of 2 updated"));
}

#[test]
fn bulk_refuses_unique_fields() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &["bulk", "booking", "BK-1", "r1", "r2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be edited in bulk"));
}

#[test]
fn read_only_session_refuses_edits() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &["--read-only", "edit", "r1", "comentario", "x"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not editable"));
}

// ---------------------------------------------------------------------------
// columns
// ---------------------------------------------------------------------------

#[test]
fn fixed_columns_cannot_be_resized() {
    let home = TempDir::new().unwrap();
    let output = shipdeck(&home, &["resize", "booking", "40"]);
    assert_success(&output);
    assert!(stdout(&output).contains("booking cannot be resized"));
}
