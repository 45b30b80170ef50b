//! End-to-end runs of the `richsync-replay` binary.

use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn write_script(script: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp script");
    write!(file, "{}", script).expect("write script");
    file
}

fn replay(script: &Value, extra: &[&str]) -> Output {
    let file = write_script(script);
    Command::new(env!("CARGO_BIN_EXE_richsync-replay"))
        .arg(file.path())
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("run richsync-replay")
}

fn lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

#[test]
fn replays_native_edits_and_enter() {
    let script = json!({
        "config": { "platform": "android" },
        "props": {
            "value": "ab",
            "selection_start": 0,
            "selection_end": 0,
            "is_selected": true
        },
        "steps": [
            { "native": { "type": "content_changed", "markup": "abc", "event_counter": 1 } },
            { "key": { "key_code": 13 } }
        ]
    });
    let output = replay(&script, &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = lines(&output);
    assert_eq!(lines[0]["step"], 0);
    assert!(lines
        .iter()
        .any(|line| line["step"] == 0 && line["surface"] == "focus"));
    assert!(lines
        .iter()
        .any(|line| line["step"] == 1 && line["outcome"] == "applied"));
    assert!(lines
        .iter()
        .any(|line| line["step"] == 1 && line["host"] == "change" && line["markup"] == "abc"));
    assert!(lines
        .iter()
        .any(|line| line["step"] == 2 && line["outcome"] == "handled"));
    assert!(lines.iter().any(|line| line["step"] == 2 && line["host"] == "enter"));
    assert!(lines
        .iter()
        .any(|line| line["step"] == 3 && line["surface"] == "blur"));
}

#[test]
fn stale_native_event_reports_stale() {
    let script = json!({
        "props": { "value": "", "selection_start": 0, "selection_end": 0, "is_selected": true },
        "steps": [
            { "native": { "type": "content_changed", "markup": "a", "event_counter": 4 } },
            { "native": { "type": "content_changed", "markup": "b", "event_counter": 2 } }
        ]
    });
    let output = replay(&script, &["--platform", "android"]);
    assert!(output.status.success());

    let lines = lines(&output);
    assert!(lines
        .iter()
        .any(|line| line["step"] == 2 && line["outcome"] == "stale"));
    let changes: Vec<&Value> = lines
        .iter()
        .filter(|line| line["host"] == "change")
        .map(|line| &line["markup"])
        .collect();
    assert_eq!(changes, vec![&json!("a")]);
}

#[test]
fn invalid_script_fails_with_context() {
    let mut file = NamedTempFile::new().expect("temp script");
    write!(file, "{{ not json").expect("write script");
    let output = Command::new(env!("CARGO_BIN_EXE_richsync-replay"))
        .arg(file.path())
        .output()
        .expect("run richsync-replay");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid script"));
}
