use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn seed(records: &[(&str, &str)]) -> (tempfile::TempDir, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let repo = tempdir().unwrap();

    fs::write(
        dir.path().join("gitriol.yml"),
        "name: mysite\nremote: ftp://example.invalid/htdocs\n",
    )
    .unwrap();

    let mut history = String::new();
    for (timestamp, revision) in records {
        history.push_str(&format!("{timestamp}: {revision}\n"));
    }
    fs::write(repo.path().join("mysite.yml"), history).unwrap();

    (dir, repo)
}

fn run_log(dir: &tempfile::TempDir, repo: &tempfile::TempDir, extra: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_gitriol"))
        .current_dir(dir.path())
        .env("GITRIOL_REPO", repo.path())
        .arg("log")
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn lists_newest_first() {
    let (dir, repo) = seed(&[
        ("2026-01-01T10:00:00.000Z", "aaa111"),
        ("2026-01-02T10:00:00.000Z", "bbb222"),
    ]);

    let stdout = run_log(&dir, &repo, &[]);
    let first = stdout.lines().next().unwrap();
    // Not a git repository, so the bare revision id is shown.
    assert!(first.contains("bbb222"), "stdout: {stdout}");
    assert!(stdout.contains("aaa111"));
}

#[test]
fn limit_truncates_and_mentions_the_rest() {
    let (dir, repo) = seed(&[
        ("2026-01-01T10:00:00.000Z", "aaa111"),
        ("2026-01-02T10:00:00.000Z", "bbb222"),
        ("2026-01-03T10:00:00.000Z", "ccc333"),
    ]);

    let stdout = run_log(&dir, &repo, &["--limit", "2"]);
    assert!(stdout.contains("ccc333"));
    assert!(stdout.contains("bbb222"));
    assert!(!stdout.contains("aaa111"));
    assert!(stdout.contains("1 more"), "stdout: {stdout}");

    let stdout = run_log(&dir, &repo, &["--all"]);
    assert!(stdout.contains("aaa111"));
    assert!(!stdout.contains("more"));
}

#[test]
fn empty_log_is_a_clean_no_op() {
    let (dir, repo) = seed(&[]);
    let stdout = run_log(&dir, &repo, &[]);
    assert!(stdout.contains("no deployments"), "stdout: {stdout}");
}
