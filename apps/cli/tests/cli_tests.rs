//! guide-cli 端到端测试
//!
//! 每个测试使用独立的临时目录作为 HOME / 数据目录，并清除远程后端环境变量，
//! 保证只走本地存储。

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn guide(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("guide-cli").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("EXPO_PUBLIC_SUPABASE_URL")
        .env_remove("EXPO_PUBLIC_SUPABASE_ANON_KEY")
        .env_remove("CAMPUS_GUIDE_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(home.path().join("store"));
    cmd
}

fn status_json(home: &TempDir) -> Value {
    let output = guide(home).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_status_reports_default_robot() {
    let home = TempDir::new().unwrap();
    let state = status_json(&home);

    assert_eq!(state["id"], "robot-1");
    assert_eq!(state["status"], "idle");
    assert_eq!(state["battery_level"], 100);
    assert_eq!(state["current_x"], 0.0);
    assert_eq!(state["current_y"], 0.0);
    assert!(state["target_classroom_id"].is_null());
}

#[test]
fn test_move_persists_between_invocations() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["move", "right", "--no-wait"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moving (20.0, 0.0)"));

    let state = status_json(&home);
    assert_eq!(state["status"], "moving");
    assert_eq!(state["current_x"], 20.0);

    // 等待稳定复位
    guide(&home)
        .args(["move", "down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idle (20.0, 20.0)"));
}

#[test]
fn test_move_up_at_edge_is_clamped() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["move", "up", "--step", "50", "--no-wait"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0.0, 0.0)"));
}

#[test]
fn test_goto_unknown_classroom_fails() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["goto", "cls-404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target not found: cls-404"));

    assert_eq!(status_json(&home)["status"], "idle");
}

#[test]
fn test_goto_follow_arrives() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["goto", "cls-1", "--follow", "--interval-ms", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("已到达 (50.0, 100.0)"));

    let state = status_json(&home);
    assert_eq!(state["status"], "arrived");
    assert_eq!(state["current_x"], 50.0);
    assert_eq!(state["current_y"], 100.0);
    assert!(state["target_classroom_id"].is_null());
}

#[test]
fn test_drive_then_stop() {
    let home = TempDir::new().unwrap();

    guide(&home).args(["goto", "cls-5"]).assert().success();
    guide(&home)
        .args(["drive", "--interval-ms", "1", "--max-ticks", "2"])
        .assert()
        .success();

    let state = status_json(&home);
    assert_eq!(state["status"], "moving");
    assert_eq!(state["target_classroom_id"], "cls-5");

    guide(&home)
        .args(["stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("急停完成"));

    let state = status_json(&home);
    assert_eq!(state["status"], "idle");
    assert!(state["target_classroom_id"].is_null());
}

#[test]
fn test_catalog_management() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["faculty", "add", "Architecture", "--floors", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Architecture"));

    guide(&home)
        .args(["classroom", "add", "EN-101", "--faculty", "fac-2", "-x", "300", "-y", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EN-101"));

    guide(&home)
        .args(["classroom", "add", "XX-1", "--faculty", "fac-99", "-x", "1", "-y", "1"])
        .assert()
        .failure();

    let output = guide(&home).args(["catalog", "--json"]).output().unwrap();
    let catalog: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(catalog["faculties"].as_array().unwrap().len(), 3);
    assert_eq!(catalog["classrooms"].as_array().unwrap().len(), 6);
}

#[test]
fn test_reset_restores_demo_data() {
    let home = TempDir::new().unwrap();

    guide(&home).args(["move", "right", "--no-wait"]).assert().success();
    guide(&home).args(["faculty", "add", "Law"]).assert().success();

    guide(&home)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idle (0.0, 0.0)"));

    let output = guide(&home).args(["catalog", "--json"]).output().unwrap();
    let catalog: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(catalog["faculties"].as_array().unwrap().len(), 2);
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["config", "set", "--url", "https://campus.example.co", "--timeout-ms", "1500"])
        .assert()
        .success();

    guide(&home)
        .args(["config", "get", "url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://campus.example.co"));

    guide(&home)
        .args(["config", "get", "timeout_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1500"));

    // 缺少密钥时仍是本地模式
    guide(&home)
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("后端: 本地"));
}

#[test]
fn test_config_schema_prints_tables() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS faculties"))
        .stdout(predicate::str::contains("REFERENCES faculties (id)"))
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS robot_state"));
}

#[test]
fn test_ping_in_local_mode() {
    let home = TempDir::new().unwrap();

    guide(&home)
        .args(["ping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("本地模式"));
}
