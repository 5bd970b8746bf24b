//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the pcbshield binary (finds it in target/debug when run via cargo test).
fn pcbshield_cli() -> Command {
    cargo_bin_cmd!("pcbshield")
}

/// Path to pcbshield library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("pcbshield")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = pcbshield_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("shield"))
        .stdout(predicate::str::contains("trace-info"));
}

#[test]
fn test_cli_version() {
    let mut cmd = pcbshield_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_shield_human() {
    let mut cmd = pcbshield_cli();
    let path = fixtures_dir().join("shield_board.kicad_pcb");

    cmd.arg("shield").arg(path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Hash shielding on F.Fab"))
        .stdout(predicate::str::contains("Border:   4"))
        .stdout(predicate::str::contains("Removed:  1"));
}

#[test]
fn test_cli_shield_json() {
    let path = fixtures_dir().join("shield_board.kicad_pcb");
    let output = pcbshield_cli()
        .arg("shield")
        .arg(&path)
        .arg("--format")
        .arg("json")
        .arg("--angle")
        .arg("30")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["request"]["angle_deg"], 30.0);
    assert!(value["segments"].as_array().unwrap().len() > 4);
    assert_eq!(value["removed"], 1);
}

#[test]
fn test_cli_shield_sexp() {
    let mut cmd = pcbshield_cli();
    let path = fixtures_dir().join("shield_board.kicad_pcb");

    cmd.arg("shield")
        .arg(path)
        .arg("--format")
        .arg("sexp")
        .arg("--target-layer")
        .arg("B.Fab");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("(gr_line (start 5.15 1.15) (end 94.85 1.15)"))
        .stdout(predicate::str::contains("(layer B.Fab)"));
}

#[test]
fn test_cli_shield_with_config_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("shielded.json");

    let mut cmd = pcbshield_cli();
    cmd.arg("shield")
        .arg(fixtures_dir().join("shield_board.json"))
        .arg("--config")
        .arg(fixtures_dir().join("settings.json"))
        .arg("--stamp-date")
        .arg("--output")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Hash shielding on B.Fab"))
        .stdout(predicate::str::contains("Date stamps updated: 1"));

    let board: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let drawings = board["drawings"].as_array().unwrap();
    assert!(drawings.iter().any(|d| d["kind"]["label"] == "shield-border-top"));
}

#[test]
fn test_cli_shield_coverage_sets_pitch() {
    let output = pcbshield_cli()
        .arg("shield")
        .arg(fixtures_dir().join("shield_board.json"))
        .arg("--width")
        .arg("0.3")
        .arg("--coverage")
        .arg("0.19")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pitch = value["request"]["pitch"].as_f64().unwrap();
    assert!((pitch - 3_000_000.0).abs() < 1.0);
}

#[test]
fn test_cli_shield_rejects_bad_angle() {
    let mut cmd = pcbshield_cli();

    cmd.arg("shield")
        .arg(fixtures_dir().join("shield_board.kicad_pcb"))
        .arg("--angle")
        .arg("90");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid parameter"));
}

#[test]
fn test_cli_shield_nonexistent_file() {
    let mut cmd = pcbshield_cli();

    cmd.arg("shield").arg("does_not_exist.kicad_pcb");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_trace_info_human() {
    let mut cmd = pcbshield_cli();

    cmd.arg("trace-info")
        .arg(fixtures_dir().join("shield_board.kicad_pcb"))
        .arg("--thickness")
        .arg("35");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("35.000um (~1 oz)"))
        .stdout(predicate::str::contains("Total length: 65.000mm"))
        .stdout(predicate::str::contains("GND"))
        .stdout(predicate::str::contains("VCC"))
        .stdout(predicate::str::contains("default"))
        .stdout(predicate::str::contains("Vias: 1"));
}

#[test]
fn test_cli_trace_info_json() {
    let output = pcbshield_cli()
        .arg("trace-info")
        .arg(fixtures_dir().join("shield_board.json"))
        .arg("--thickness-um")
        .arg("35")
        .arg("--external")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let resistance = value["nets"]["1"]["resistance_ohm"].as_f64().unwrap();
    assert!((resistance - 0.00491429).abs() < 1e-6);
    assert_eq!(value["options"]["internal_layer"], false);
}

#[test]
fn test_cli_trace_info_rejects_unknown_preset() {
    let mut cmd = pcbshield_cli();

    cmd.arg("trace-info")
        .arg(fixtures_dir().join("shield_board.json"))
        .arg("--thickness")
        .arg("50");

    cmd.assert().failure();
}

#[test]
fn test_cli_width() {
    let mut cmd = pcbshield_cli();

    cmd.arg("width").arg("--current").arg("1").arg("--thickness-um").arg("35");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Required width:"))
        .stdout(predicate::str::contains("Capacity:       1.000A"));
}

#[test]
fn test_cli_exit_codes() {
    let mut cmd = pcbshield_cli();
    cmd.arg("trace-info").arg(fixtures_dir().join("shield_board.json"));
    cmd.assert().code(0);

    let mut cmd = pcbshield_cli();
    cmd.arg("trace-info").arg(fixtures_dir().join("truncated.kicad_pcb"));
    cmd.assert().code(1);
}
