#![allow(deprecated)]
use assert_cmd::Command;
use future_you_core::reflection::ReflectionEntry;
use future_you_core::store::ProfileStore;
use predicates::prelude::*;
use tempfile::TempDir;

fn future_you(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("future-you").unwrap();
    cmd.current_dir(dir.path())
        .env("FUTURE_YOU_ROOT", dir.path())
        .env_remove("GEMINI_API_KEY");
    cmd
}

fn init(dir: &TempDir) {
    future_you(dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// future-you init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_data_tree() {
    let dir = TempDir::new().unwrap();
    future_you(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .future-you/config.yaml"));

    assert!(dir.path().join(".future-you").is_dir());
    assert!(dir.path().join(".future-you/documents").is_dir());
    assert!(dir.path().join(".future-you/local").is_dir());
    assert!(dir.path().join(".future-you/config.yaml").exists());
}

#[test]
fn init_is_idempotent_and_keeps_edits() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let path = dir.path().join(".future-you/config.yaml");
    let edited = std::fs::read_to_string(&path)
        .unwrap()
        .replace("3141", "4000");
    std::fs::write(&path, &edited).unwrap();

    future_you(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), edited);
}

// ---------------------------------------------------------------------------
// future-you config
// ---------------------------------------------------------------------------

#[test]
fn config_show_before_init_fails() {
    let dir = TempDir::new().unwrap();
    future_you(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn config_show_prints_defaults() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    future_you(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port: 3141"))
        .stdout(predicate::str::contains("gemini-3-flash-preview"));
}

#[test]
fn config_show_json() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let out = future_you(&dir)
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["server"]["port"], 3141);
    assert_eq!(json["auth"]["min_password_len"], 6);
}

#[test]
fn config_validate_warns_without_api_key() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    future_you(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: GEMINI_API_KEY is not set"));
}

#[test]
fn config_validate_rejects_zero_timeout() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let path = dir.path().join(".future-you/config.yaml");
    let edited = std::fs::read_to_string(&path)
        .unwrap()
        .replace("timeout_secs: 30", "timeout_secs: 0");
    std::fs::write(&path, edited).unwrap();

    future_you(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config has 1 error(s)"));
}

// ---------------------------------------------------------------------------
// future-you reflections / languages
// ---------------------------------------------------------------------------

#[test]
fn reflections_empty_for_new_user() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    future_you(&dir)
        .args(["reflections", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No reflections saved for u1."));
}

#[test]
fn reflections_lists_saved_entries() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let store = ProfileStore::open(dir.path());
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(store.append_reflection("u1", &ReflectionEntry::new("What made you smile?", "The sea.")))
        .unwrap();

    future_you(&dir)
        .args(["reflections", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What made you smile?"))
        .stdout(predicate::str::contains("The sea."));

    let out = future_you(&dir)
        .args(["--json", "reflections", "--user", "u1"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["response"], "The sea.");
}

#[test]
fn languages_lists_all_twelve() {
    let dir = TempDir::new().unwrap();
    let out = future_you(&dir)
        .args(["languages", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 12);
    assert!(list
        .iter()
        .any(|l| l["code"] == "ar" && l["rtl"] == true));
}
