//! End-to-end tests driving the `tk` binary against a temp document.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tk").expect("tk binary");
    cmd.current_dir(dir.path());
    cmd.env_remove("FORMAT");
    cmd.env("TICKETS_FILE", dir.path().join("tickets.json"));
    cmd
}

// ---------------------------------------------------------------------------
// Create / show / list
// ---------------------------------------------------------------------------

#[test]
fn create_show_list_round_trip() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args([
            "create",
            "--title",
            "Fix login timeout",
            "--description",
            "Session expires too early",
            "--project",
            "auth",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("TICKET-0001"));

    tk(&dir)
        .args(["show", "TICKET-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix login timeout"));

    tk(&dir)
        .args(["list", "--project", "AUTH", "--status", "open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TICKET-0001"));
}

#[test]
fn show_unknown_ticket_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["show", "TICKET-0404", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));
}

// ---------------------------------------------------------------------------
// Graph integrity through the CLI
// ---------------------------------------------------------------------------

#[test]
fn create_with_missing_dependency_fails() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args([
            "create",
            "--title",
            "Blocked",
            "--description",
            "d",
            "--blocked-by",
            "TICKET-0099",
            "--json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2004"));
}

#[test]
fn circular_update_fails_with_cycle_code() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["create", "--title", "A", "--description", "d"])
        .assert()
        .success();
    tk(&dir)
        .args([
            "create", "--title", "B", "--description", "d", "--blocked-by", "TICKET-0001",
        ])
        .assert()
        .success();

    tk(&dir)
        .args([
            "update",
            "TICKET-0001",
            "--blocked-by",
            "TICKET-0002",
            "--json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2005"));
}

#[test]
fn next_shows_the_unlock_cascade() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["create", "--title", "Foundation", "--description", "d"])
        .assert()
        .success();
    tk(&dir)
        .args([
            "create",
            "--title",
            "Walls",
            "--description",
            "d",
            "--blocked-by",
            "TICKET-0001",
        ])
        .assert()
        .success();

    // Piped stdout resolves to text mode.
    tk(&dir)
        .args(["next"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("TICKET-0001  ready  Foundation")
                .and(predicate::str::contains("unblocks  TICKET-0002  Walls")),
        );

    // Closing the blocker moves the frontier.
    tk(&dir)
        .args(["update", "TICKET-0001", "--status", "closed"])
        .assert()
        .success();
    tk(&dir)
        .args(["next"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("TICKET-0002  ready  Walls")
                .and(predicate::str::contains("TICKET-0001  ready").not()),
        );
}

#[test]
fn delete_cleans_up_references() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["create", "--title", "A", "--description", "d"])
        .assert()
        .success();
    tk(&dir)
        .args([
            "create", "--title", "B", "--description", "d", "--blocked-by", "TICKET-0001",
        ])
        .assert()
        .success();

    tk(&dir).args(["delete", "TICKET-0001"]).assert().success();

    let out = tk(&dir)
        .args(["show", "TICKET-0002", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let ticket: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(ticket["blockedBy"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[test]
fn batch_create_from_stdin() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["batch", "create"])
        .write_stdin(
            r#"[
                {"title": "One", "description": "d"},
                {"title": "Two", "description": "d"}
            ]"#,
        )
        .assert()
        .success()
        .stdout(
            predicate::str::contains("TICKET-0001").and(predicate::str::contains("TICKET-0002")),
        );
}

#[test]
fn failed_batch_update_leaves_the_document_untouched() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["create", "--title", "X", "--description", "d"])
        .assert()
        .success();
    let before = std::fs::read_to_string(dir.path().join("tickets.json")).expect("read");

    tk(&dir)
        .args(["batch", "update", "--json"])
        .write_stdin(
            r#"[
                {"id": "TICKET-0001", "title": "Renamed"},
                {"id": "TICKET-0404", "title": "x"}
            ]"#,
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));

    let after = std::fs::read_to_string(dir.path().join("tickets.json")).expect("read");
    assert_eq!(after, before);
}

// ---------------------------------------------------------------------------
// Migration through the CLI
// ---------------------------------------------------------------------------

#[test]
fn migrate_brings_a_v1_document_current_then_noops() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("tickets.json");
    std::fs::write(
        &path,
        r#"{
  "tickets": {
    "TICKET-0001": {
      "id": "TICKET-0001",
      "title": "Old record",
      "description": "written by the oldest release",
      "status": "open",
      "dependencies": [],
      "createdAt": "2023-01-01T00:00:00Z",
      "updatedAt": "2023-01-01T00:00:00Z"
    }
  }
}"#,
    )
    .expect("write fixture");

    tk(&dir)
        .args(["migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("migrated from 0.1.0 in 2 step(s)"));
    assert!(dir.path().join("tickets.json.0.1.0.bak").exists());
    assert!(dir.path().join("tickets.json.0.2.0.bak").exists());

    tk(&dir)
        .args(["migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already-current"));

    // The migrated document serves normally.
    tk(&dir)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TICKET-0001"));
}

#[test]
fn data_commands_migrate_automatically() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("tickets.json");
    std::fs::write(
        &path,
        r#"{
  "tickets": {
    "TICKET-0001": {
      "id": "TICKET-0001",
      "title": "Old record",
      "description": "d",
      "status": "open",
      "dependencies": [],
      "createdAt": "2023-01-01T00:00:00Z",
      "updatedAt": "2023-01-01T00:00:00Z"
    }
  }
}"#,
    )
    .expect("write fixture");

    tk(&dir)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TICKET-0001"));

    let migrated = std::fs::read_to_string(&path).expect("read");
    assert!(migrated.contains("\"blockedBy\""));
    assert!(migrated.contains("\"0.3.0\""));
}

#[test]
fn unknown_future_version_halts_every_data_command() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("tickets.json"),
        r#"{ "version": "9.0.0", "tickets": {} }"#,
    )
    .expect("write");

    tk(&dir)
        .args(["list", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4001"));
}

// ---------------------------------------------------------------------------
// Path validation
// ---------------------------------------------------------------------------

#[test]
fn non_json_document_path_is_rejected() {
    let dir = TempDir::new().expect("tempdir");

    tk(&dir)
        .args(["--file", "tickets.yaml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".json"));
}
