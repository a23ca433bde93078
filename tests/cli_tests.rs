//! CLI integration tests for Playrecap
//!
//! Runs the `playrecap` binary with isolated configuration directories.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STATS_JSON: &str = r#"{
  "hosts": {
    "web2": {"ok": 6, "changed": 1, "unreachable": 0, "failed": 1, "skipped": 0, "rescued": 0, "ignored": 0},
    "web1": {"ok": 5, "changed": 2, "unreachable": 0, "failed": 0, "skipped": 1, "rescued": 0, "ignored": 0}
  },
  "custom": {"region": "eu-west"}
}"#;

const EVENTS: &str = r#"{"event":"run_start","check_mode":false}
{"event":"play_start","name":"webservers"}
{"event":"task_start","task_id":"t1","name":"wait for port","retries":3}
{"event":"host_task_start","host":"web1","task_id":"t1"}
{"event":"retry","host":"web1","task_id":"t1","attempt":1,"retries":3}
{"event":"host_ok","host":"web1","task_id":"t1","attempts":2}
{"event":"run_end","stats":{"hosts":{"web1":{"ok":1,"changed":0,"unreachable":0,"failed":0,"skipped":0,"rescued":0,"ignored":0}}}}
"#;

/// A command running inside `dir`, with user config locations pointed at it.
fn playrecap(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("playrecap").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("PLAYRECAP_CONFIG")
        .env_remove("PLAYRECAP_LAYOUT")
        .env_remove("PLAYRECAP_GLYPHS")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    playrecap(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("recap"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    playrecap(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_recap_table() {
    let dir = TempDir::new().unwrap();
    let stats = write(dir.path(), "stats.json", STATS_JSON);

    playrecap(dir.path())
        .args(["--no-color", "recap", &stats])
        .assert()
        .success()
        .stdout(predicate::str::contains("PLAY RECAP ***"))
        .stdout(predicate::str::contains(
            "Total  11        3            0       1        1        0        0     16",
        ))
        .stdout(predicate::str::contains("CUSTOM STATS").not())
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_recap_inline_with_custom_and_dry_run() {
    let dir = TempDir::new().unwrap();
    let stats = write(dir.path(), "stats.json", STATS_JSON);

    playrecap(dir.path())
        .args([
            "--no-color",
            "recap",
            &stats,
            "--layout",
            "inline",
            "--show-custom",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("web1                       : ok=5"))
        .stdout(predicate::str::contains("\tregion: eu-west"))
        .stdout(predicate::str::contains("DRY RUN ***"));
}

#[test]
fn test_recap_yaml_with_config_file() {
    let dir = TempDir::new().unwrap();
    let stats = write(
        dir.path(),
        "stats.yml",
        "hosts:\n  web1: {ok: 1, changed: 0, unreachable: 0, failed: 0, skipped: 0, rescued: 0, ignored: 0}\n",
    );
    let config = write(dir.path(), "recap.toml", "[recap]\nlayout = \"inline\"\n");

    playrecap(dir.path())
        .args(["--no-color", "-c", &config, "recap", &stats])
        .assert()
        .success()
        .stdout(predicate::str::contains("web1                       : ok=1"));
}

#[test]
fn test_recap_writes_log_file() {
    let dir = TempDir::new().unwrap();
    let stats = write(dir.path(), "stats.json", STATS_JSON);
    let log = dir.path().join("recap.log");

    playrecap(dir.path())
        .args(["--no-color", "recap", &stats, "--log-file"])
        .arg(&log)
        .assert()
        .success();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("web2                       : ok=6"));
    assert!(text.contains("total=16"));
}

#[test]
fn test_recap_incomplete_counters_fail() {
    let dir = TempDir::new().unwrap();
    let stats = write(dir.path(), "stats.json", r#"{"hosts": {"web1": {"ok": 1}}}"#);

    playrecap(dir.path())
        .args(["--no-color", "recap", &stats])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing counters"));
}

#[test]
fn test_recap_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    playrecap(dir.path())
        .args(["recap", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read stats file"));
}

#[test]
fn test_replay_events() {
    let dir = TempDir::new().unwrap();
    let events = write(dir.path(), "events.jsonl", EVENTS);

    playrecap(dir.path())
        .args(["--no-color", "replay", &events])
        .assert()
        .success()
        .stdout(predicate::str::contains("[webservers]"))
        .stdout(predicate::str::contains("ok: [web1]"))
        .stdout(predicate::str::contains("PLAY RECAP"));
}

#[test]
fn test_replay_without_progress_shows_retry_line() {
    let dir = TempDir::new().unwrap();
    let events = write(dir.path(), "events.jsonl", EVENTS);

    playrecap(dir.path())
        .args(["--no-color", "replay", &events, "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "FAILED - RETRYING: [web1]: wait for port (1 of 3)",
        ));
}

#[test]
fn test_replay_invalid_event_reports_line() {
    let dir = TempDir::new().unwrap();
    let events = write(
        dir.path(),
        "events.jsonl",
        "{\"event\":\"play_start\",\"name\":\"p\"}\n{\"event\":\"explode\"}\n",
    );

    playrecap(dir.path())
        .args(["--no-color", "replay", &events])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid event on line 2"));
}
