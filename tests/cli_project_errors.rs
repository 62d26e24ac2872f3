use std::fs;
use std::process::Command;

use tempfile::tempdir;

#[test]
fn log_outside_a_project_fails() {
    let dir = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_gitriol"))
        .current_dir(dir.path())
        .arg("log")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gitriol.yml"), "stderr: {stderr}");
}

#[test]
fn deploy_without_history_points_at_init() {
    let dir = tempdir().unwrap();
    let repo = tempdir().unwrap();

    fs::write(
        dir.path().join("gitriol.yml"),
        "name: mysite\nremote: ftp://example.invalid/htdocs\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_gitriol"))
        .current_dir(dir.path())
        .env("GITRIOL_REPO", repo.path())
        .args(["deploy", "HEAD"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gitriol init"), "stderr: {stderr}");
}

#[test]
fn broken_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("gitriol.yml"), "name: [unclosed\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_gitriol"))
        .current_dir(dir.path())
        .arg("log")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "stderr: {stderr}");
}
