//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pharmq-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("PharmQ prediction engine"),
        "Should show app description"
    );
    assert!(stdout.contains("models"), "Should show models command");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("status"), "Should show status command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pharmq-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("pharmq"), "Should show binary name");
}

/// Test models subcommand help
#[test]
fn test_models_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pharmq-cli", "--", "models", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Models help should succeed");
    assert!(stdout.contains("list"), "Should show list subcommand");
    assert!(stdout.contains("load"), "Should show load subcommand");
    assert!(stdout.contains("unload"), "Should show unload subcommand");
}

/// Test predict dti subcommand help
#[test]
fn test_predict_dti_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pharmq-cli", "--", "predict", "dti", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict dti help should succeed");
    assert!(stdout.contains("--drug"), "Should show drug option");
    assert!(stdout.contains("--target"), "Should show target option");
}

/// Test predict similarity subcommand help
#[test]
fn test_predict_similarity_help() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "pharmq-cli",
            "--",
            "predict",
            "similarity",
            "--help",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "Predict similarity help should succeed"
    );
    assert!(
        stdout.contains("--threshold"),
        "Should show threshold option"
    );
    assert!(
        stdout.contains("--max-results"),
        "Should show max-results option"
    );
}

/// Test that an invalid task name fails fast
#[test]
fn test_invalid_subcommand_fails() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pharmq-cli", "--", "bogus"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Unknown subcommand should fail");
}
