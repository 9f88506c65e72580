//! Integration tests for the pitlane CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a pitlane command
fn pitlane() -> Command {
    Command::cargo_bin("pitlane").unwrap()
}

/// Helper to create an empty project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    pitlane().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to write a record file into the project's snapshot directory
fn write_records(tmp: &TempDir, kind_dir: &str, name: &str, contents: &str) {
    let dir = tmp.path().join("data").join(kind_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

/// Project with one team, two cars, four parts and five installations.
///
/// Cumulative wear: PART-1 90% (critical), PART-2 20%, PART-3 untracked,
/// PART-4 104% (needs replacement).
fn setup_fleet_project() -> TempDir {
    let tmp = setup_test_project();

    write_records(
        &tmp,
        "teams",
        "teams.yaml",
        r#"
- team_id: 1
  name: Scuderia Test
  country: Italy
  principal_name: A. Boss
"#,
    );

    write_records(
        &tmp,
        "cars",
        "cars.yaml",
        r#"
- car_id: 1
  car_number: 16
  chassis_number: SF-24-01
  status: active
  team: 1
- car_id: 2
  car_number: 55
  chassis_number: SF-24-02
  status: maintenance
  team: 1
"#,
    );

    write_records(
        &tmp,
        "parts",
        "parts.yaml",
        r#"
- part_id: 1
  part_type: Gearbox
  serial_number: GB-ABC-01
  manufacturer: Xtrac
  fia_lifecycle_limit: 10000
- part_id: 2
  part_type: Gearbox
  serial_number: GB-XYZ-02
  manufacturer: Xtrac
  fia_lifecycle_limit: 10000
- part_id: 3
  part_type: Front Wing
  serial_number: FW-ABC-03
- part_id: 4
  part_type: Power Unit
  serial_number: PU-001
  fia_lifecycle_limit: 5000
"#,
    );

    write_records(
        &tmp,
        "car_parts",
        "installs.yaml",
        r#"
- car_part_id: 1
  car: 1
  part: 1
  installed_at: 2024-01-10T09:00:00Z
  removed_at: 2024-03-01T18:00:00Z
  mileage: 5000
- car_part_id: 2
  car: 1
  part: 1
  installed_at: 2024-04-01T09:00:00Z
  mileage: 4000
- car_part_id: 3
  car: 2
  part: 2
  installed_at: 2024-02-01T09:00:00Z
  mileage: 2000
- car_part_id: 4
  car: 1
  part: 3
  installed_at: 2024-03-05T09:00:00Z
- car_part_id: 5
  car: 2
  part: 4
  installed_at: 2024-01-15T09:00:00Z
  mileage: 5200
"#,
    );

    tmp
}

// ============================================================================
// Basic Commands
// ============================================================================

#[test]
fn test_help_displays() {
    pitlane()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lifecycle"));
}

#[test]
fn test_version_displays() {
    pitlane()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pitlane"));
}

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    pitlane()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized pitlane project"));

    assert!(tmp.path().join(".pitlane/config.yaml").exists());
    for dir in ["teams", "cars", "parts", "car_parts"] {
        assert!(tmp.path().join("data").join(dir).is_dir());
    }
}

#[test]
fn test_init_twice_leaves_project_alone() {
    let tmp = setup_test_project();
    pitlane()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a pitlane project"));
}

#[test]
fn test_empty_project_lists_nothing() {
    let tmp = setup_test_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No parts found."));
}

#[test]
fn test_completions_bash() {
    pitlane()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pitlane"));
}

// ============================================================================
// Part Commands
// ============================================================================

#[test]
fn test_part_list_natural_order() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-1\nPART-2\nPART-3\nPART-4\n");
}

#[test]
fn test_part_list_filter_and_search() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--part-type", "Gearbox", "--search", "abc", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-1\n");
}

#[test]
fn test_part_list_search_spans_types() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--search", "ABC", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-1\nPART-3\n");
}

#[test]
fn test_part_list_count() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--manufacturer", "Xtrac", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_part_list_descending_by_percentage() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--ordering", "-lifecycle_percentage", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-3\nPART-4\nPART-1\nPART-2\n");
}

#[test]
fn test_part_list_unknown_ordering_fails() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--ordering", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn test_part_list_page_zero_fails() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid page request"));
}

#[test]
fn test_part_list_page_beyond_last_is_empty() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--page", "3", "--page-size", "2", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 4"))
        .stdout(predicate::str::contains("\"results\": []"));
}

#[test]
fn test_part_list_json_has_derived_fields() {
    let tmp = setup_fleet_project();
    let output = pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "--serial", "GB-ABC-01", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let part = &page["results"][0];
    assert_eq!(part["part_id"], 1);
    assert_eq!(part["current_mileage"], 9000);
    assert_eq!(part["lifecycle_percentage"], 90.0);
    assert_eq!(part["lifecycle_tier"], "critical");
    assert_eq!(part["needs_replacement"], false);
    assert_eq!(part["is_installed"], true);
}

#[test]
fn test_part_show() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "show", "PART-4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PU-001"))
        .stdout(predicate::str::contains("104.0%"))
        .stdout(predicate::str::contains("Needs replacement"));
}

#[test]
fn test_part_show_unknown_fails() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PART-99"));
}

#[test]
fn test_part_warnings_most_worn_first() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "warnings", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-4\nPART-1\n");
}

#[test]
fn test_part_warnings_replacement_only() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["part", "warnings", "--replacement", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-4\n");
}

// ============================================================================
// Car and Installation Commands
// ============================================================================

#[test]
fn test_car_list_filter_by_status() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["car", "list", "--status", "maintenance", "-f", "id"])
        .assert()
        .success()
        .stdout("CAR-2\n");
}

#[test]
fn test_car_history_most_recent_first() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["car", "history", "CAR-1", "-f", "id"])
        .assert()
        .success()
        .stdout("INST-2\nINST-4\nINST-1\n");
}

#[test]
fn test_car_history_json_timeline() {
    let tmp = setup_fleet_project();
    let output = pitlane()
        .current_dir(tmp.path())
        .args(["car", "history", "1", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let timeline: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = timeline["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["car_part_id"], 2);
    assert_eq!(entries[0]["lifecycle_percentage"], 40.0);
    assert!(entries[1]["lifecycle_percentage"].is_null());
}

#[test]
fn test_install_active() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["install", "active", "-f", "id"])
        .assert()
        .success()
        .stdout("INST-2\nINST-3\nINST-4\nINST-5\n");
}

#[test]
fn test_install_list_by_part() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["install", "list", "--part", "PART-1", "-f", "id"])
        .assert()
        .success()
        .stdout("INST-1\nINST-2\n");
}

#[test]
fn test_install_list_by_manufacturer() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["install", "list", "--manufacturer", "Xtrac", "-f", "id"])
        .assert()
        .success()
        .stdout("INST-1\nINST-2\nINST-3\n");
}

#[test]
fn test_install_show_json_nests_car_and_part() {
    let tmp = setup_fleet_project();
    let output = pitlane()
        .current_dir(tmp.path())
        .args(["install", "show", "INST-2", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["car_part_id"], 2);
    assert_eq!(detail["lifecycle_percentage"], 40.0);
    assert_eq!(detail["car_details"]["chassis_number"], "SF-24-01");
    assert_eq!(detail["part_details"]["lifecycle_percentage"], 90.0);
}

#[test]
fn test_car_history_paged_matches_timeline() {
    let tmp = setup_fleet_project();
    let output = pitlane()
        .current_dir(tmp.path())
        .args(["car", "history", "1", "--paged", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<i64> = page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["car_part_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 4, 1]);
    assert_eq!(page["count"], 3);
}

#[test]
fn test_team_show_lists_cars() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .args(["team", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scuderia Test"))
        .stdout(predicate::str::contains("SF-24-02"));
}

// ============================================================================
// Status and Validation
// ============================================================================

#[test]
fn test_status_json() {
    let tmp = setup_fleet_project();
    let output = pitlane()
        .current_dir(tmp.path())
        .args(["status", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["fleet"]["cars"], 2);
    assert_eq!(status["parts"]["total"], 4);
    assert_eq!(status["lifecycle"]["needs_replacement"], 1);
    assert_eq!(status["warnings"][0]["id"], "PART-4");
    assert_eq!(status["health"], "Critical");
}

#[test]
fn test_status_dashboard() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pitlane Fleet Status"))
        .stdout(predicate::str::contains("GB-ABC-01"));
}

#[test]
fn test_validate_clean_snapshot() {
    let tmp = setup_fleet_project();
    pitlane()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot is consistent"));
}

#[test]
fn test_validate_reports_overlap_and_double_install() {
    let tmp = setup_fleet_project();
    write_records(
        &tmp,
        "car_parts",
        "extra.yaml",
        r#"
car_part_id: 6
car: 1
part: 2
installed_at: 2024-05-01T09:00:00Z
mileage: 100
"#,
    );

    let output = pitlane()
        .current_dir(tmp.path())
        .args(["validate", "-f", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"multiple_active_installations"));
    assert!(kinds.contains(&"overlapping_installations"));
}

#[test]
fn test_validate_reports_unreadable_file() {
    let tmp = setup_fleet_project();
    write_records(&tmp, "parts", "broken.yaml", "part_id: [not a number\n");

    pitlane()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("broken.yaml"));
}

#[test]
fn test_unreadable_file_does_not_block_listing() {
    let tmp = setup_fleet_project();
    write_records(&tmp, "parts", "broken.yaml", "part_id: [not a number\n");

    pitlane()
        .current_dir(tmp.path())
        .args(["part", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("PART-1\nPART-2\nPART-3\nPART-4\n")
        .stderr(predicate::str::contains("1 file(s) skipped"));
}

#[test]
fn test_config_default_format() {
    let tmp = setup_fleet_project();
    fs::write(tmp.path().join(".pitlane/config.yaml"), "default_format: id\n").unwrap();

    pitlane()
        .current_dir(tmp.path())
        .args(["car", "list"])
        .assert()
        .success()
        .stdout("CAR-1\nCAR-2\n");
}
