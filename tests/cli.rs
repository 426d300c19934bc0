use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_session-chronicle"))
        .arg("--projects-dir")
        .arg(root)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn event(kind: &str, ts: &str, text: &str) -> String {
    json!({"type": kind, "timestamp": ts, "message": {"role": kind, "content": text}}).to_string()
}

fn root_with_sessions(ids: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("-work-app");
    fs::create_dir_all(&dir).unwrap();
    for id in ids {
        let content = [
            event("user", "2026-01-24T12:00:00Z", "Investigate flaky test"),
            event("assistant", "2026-01-24T12:01:00Z", "Found it."),
        ]
        .join("\n");
        fs::write(dir.join(format!("{}.jsonl", id)), content).unwrap();
    }
    tmp
}

#[test]
fn list_json_to_stdout() {
    let tmp = root_with_sessions(&["abc123"]);
    let output = run(tmp.path(), &["-o", "json"]);

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_sessions"], 1);
    assert_eq!(json["total_messages"], 2);
    assert_eq!(json["dates"][0]["sessions"][0]["session_id"], "abc123");
    assert_eq!(json["dates"][0]["sessions"][0]["is_orphan"], true);
}

#[test]
fn no_sessions_is_success() {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["-o", "text"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No sessions found."));
}

#[test]
fn unknown_format_fails_before_scanning() {
    let tmp = TempDir::new().unwrap();
    let output = run(&tmp.path().join("absent"), &["-o", "yaml"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid output format 'yaml'"));
}

#[test]
fn missing_root_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run(&tmp.path().join("absent"), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("projects directory not found"));
}

#[test]
fn ambiguous_view_prints_candidates_only() {
    let tmp = root_with_sessions(&["49f2e931-aaaa", "49f2e900-bbbb"]);
    let output = run(tmp.path(), &["view", "49f2e9"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("49f2e931-aaaa"));
    assert!(stderr.contains("49f2e900-bbbb"));
}

#[test]
fn view_not_found_fails() {
    let tmp = root_with_sessions(&["abc123"]);
    let output = run(tmp.path(), &["view", "zzz"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("session not found: zzz"));
}

#[test]
fn view_saves_to_file() {
    let tmp = root_with_sessions(&["abc123"]);
    let out_dir = TempDir::new().unwrap();
    let target = out_dir.path().join("abc.md");

    let output = run(
        tmp.path(),
        &["view", "abc", "-m", "1", "--save", target.to_str().unwrap()],
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let saved = fs::read_to_string(&target).unwrap();
    assert!(saved.starts_with("# Session: abc123\n"));
    assert!(saved.contains("showing last 1 of 2 messages"));
    assert!(saved.contains("Found it."));
    assert!(!saved.contains("Investigate flaky test"));
}

#[test]
fn skipped_files_are_summarised_on_stderr() {
    let tmp = root_with_sessions(&["abc123"]);
    let dir = tmp.path().join("-work-app");
    fs::write(dir.join("sessions-index.json"), "{ not json").unwrap();
    fs::write(dir.join("garbage.jsonl"), "not an event\n").unwrap();

    let output = run(tmp.path(), &["-o", "json"]);

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_sessions"], 1);
    assert_eq!(json["dates"][0]["sessions"][0]["session_id"], "abc123");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(
        "warning: 1 index file ignored, 1 transcript skipped, 1 malformed line skipped"
    ));
}
