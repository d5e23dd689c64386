#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rotapost(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rotapost").unwrap();
    cmd.current_dir(dir.path())
        .env("ROTAPOST_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init_project(dir: &TempDir) {
    rotapost(dir).arg("init").assert().success();
}

fn read(dir: &TempDir, rel: &str) -> String {
    std::fs::read_to_string(dir.path().join(rel)).unwrap()
}

// ---------------------------------------------------------------------------
// rotapost init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_project_files() {
    let dir = TempDir::new().unwrap();
    rotapost(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .rotapost/settings.yaml"));

    for file in [
        "settings.yaml",
        "destinations.yaml",
        "content.yaml",
        "photos.yaml",
        "schedule.yaml",
        "rules.yaml",
    ] {
        assert!(dir.path().join(".rotapost").join(file).exists(), "{file} missing");
    }
    assert!(dir.path().join(".rotapost/data").is_dir());
    assert!(dir.path().join("photos").is_dir());
}

#[test]
fn init_does_not_overwrite_edits() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(dir.path().join(".rotapost/schedule.yaml"), "week_a: {}\n").unwrap();

    rotapost(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .rotapost/schedule.yaml"));
    assert_eq!(read(&dir, ".rotapost/schedule.yaml"), "week_a: {}\n");
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    rotapost(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// rotapost config validate
// ---------------------------------------------------------------------------

#[test]
fn sample_config_is_valid() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    rotapost(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn validate_warns_on_unknown_schedule_ids() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".rotapost/schedule.yaml"),
        "week_a:\n  monday: [local-tips, ghost]\nweek_b:\n  tuesday: [neighbours]\n",
    )
    .unwrap();

    rotapost(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning] schedule lists unknown destination 'ghost'"));
}

#[test]
fn validate_fails_on_errors() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".rotapost/settings.yaml"),
        "safety:\n  max_failures: 0\n",
    )
    .unwrap();

    rotapost(&dir)
        .args(["--json", "config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("max_failures"))
        .stderr(predicate::str::contains("config validation found errors"));
}

// ---------------------------------------------------------------------------
// rotapost generate
// ---------------------------------------------------------------------------

#[test]
fn generate_previews_monday_plan() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    // 2026-10-12 is a Monday in an even ISO week.
    let out = rotapost(&dir)
        .args(["--json", "generate", "--date", "2026-10-12"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(plan["period"], "week_a");
    let entries = plan["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["destination_id"], "local-tips");
    assert_eq!(entries[0]["request"]["content_id"], "security-passwords");
    assert_eq!(entries[0]["request"]["photo_filename"], "lock.jpg");
    assert_eq!(entries[0]["request"]["capture_rules"], true);
    // Promotion is off for this group, so no follow-up comment.
    assert!(entries[0]["request"].get("follow_up_comment").is_none());
    assert_eq!(entries[1]["destination_id"], "shop-page");
    assert_eq!(entries[1]["request"]["content_id"], "page-monday");
    assert_eq!(entries[1]["request"]["is_page"], true);

    assert!(!dir.path().join(".rotapost/data/history.json").exists());
}

#[test]
fn generate_on_quiet_day() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    // Saturday: nothing scheduled and no page slot.
    rotapost(&dir)
        .args(["generate", "--date", "2026-10-17"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing due."));
}

// ---------------------------------------------------------------------------
// rotapost run / post
// ---------------------------------------------------------------------------

#[test]
fn run_dry_run_records_nothing() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    rotapost(&dir).args(["run", "--dry-run"]).assert().success();
    assert!(!dir.path().join(".rotapost/data/history.json").exists());
}

#[test]
fn run_without_executor_is_refused() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    rotapost(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--exec"));
}

#[test]
fn post_unknown_destination_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    rotapost(&dir)
        .args(["post", "ghost", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("destination not found: ghost"));
}

#[cfg(unix)]
#[test]
fn post_with_command_executor_records_history_and_photo_use() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    rotapost(&dir)
        .args([
            "post",
            "local-tips",
            "--exec",
            "sh",
            "--exec-arg=-c",
            r#"--exec-arg=cat >/dev/null; echo '{"success": true, "message": "ok"}'"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("security-passwords -> local-tips"));

    let history: serde_json::Value =
        serde_json::from_str(&read(&dir, ".rotapost/data/history.json")).unwrap();
    let entries = history["local-tips"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["content_id"], "security-passwords");
    assert_eq!(entries[0]["success"], true);

    let photos = read(&dir, ".rotapost/photos.yaml");
    assert!(photos.contains("filename: lock.jpg\n  category: security\n  used_count: 1"));

    // The same item is never offered to the same group twice.
    rotapost(&dir)
        .args(["--json", "post", "local-tips", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tips-updates"));
}

#[cfg(unix)]
#[test]
fn failed_post_is_recorded_and_reported() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    rotapost(&dir)
        .args([
            "post",
            "local-tips",
            "--exec",
            "sh",
            "--exec-arg=-c",
            r#"--exec-arg=cat >/dev/null; echo '{"success": false, "error": "blocked"}'"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("blocked"));

    let history = read(&dir, ".rotapost/data/history.json");
    assert!(history.contains("\"success\": false"));
    // A failed post does not use up the photo.
    assert!(!read(&dir, ".rotapost/photos.yaml").contains("used_count: 1"));
}

// ---------------------------------------------------------------------------
// rotapost pause / resume / status
// ---------------------------------------------------------------------------

#[test]
fn pause_blocks_runs_until_resume() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    rotapost(&dir)
        .args(["pause", "checking", "account"])
        .assert()
        .success();
    assert!(dir.path().join(".rotapost/data/paused.lock").exists());

    rotapost(&dir)
        .args(["run", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("paused (checking account)"));

    rotapost(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("PAUSED: checking account"));

    rotapost(&dir)
        .arg("resume")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resumed."));
    rotapost(&dir).args(["run", "--dry-run"]).assert().success();
}

#[test]
fn status_json_reports_counts() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let out = rotapost(&dir)
        .args(["--json", "status"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let status: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(status["paused"], false);
    assert_eq!(status["stats"]["active_groups"], 2);
    assert_eq!(status["stats"]["content_total"], 7);
    assert_eq!(status["stats"]["posts_total"], 0);
    assert_eq!(status["posts_per_day"]["min"], 4);
    assert_eq!(status["posts_per_day"]["max"], 6);
}

#[test]
fn status_shows_daily_target() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    rotapost(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 posted today (target 4-6)"));
}
