use assert_cmd::Command;
use caseflow_test_utils::{temp_dir, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

/// Run the binary from an empty directory with no Caseflow variables set.
fn caseflow_policy(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("caseflow-policy").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CASEFLOW_CONFIG")
        .env_remove("CASEFLOW_POLICY")
        .env_remove("CASEFLOW_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn check_builtin_policy() {
    let dir = temp_dir();
    caseflow_policy(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("built-in policy: ok"));
}

#[test]
fn check_invalid_policy_exits_with_problems() {
    let dir = temp_dir();
    write_file(
        dir.path(),
        "policy.yaml",
        r#"
roles: { user: 1, admin: 3 }
resources: [feedback]
actions: [read]
permissions:
  user:
    feedback: { read: assigned }
"#,
    );

    caseflow_policy(&dir)
        .args(["check", "policy.yaml"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("2 problem(s)"))
        .stdout(predicate::str::contains("assignee"));
}

#[test]
fn explain_uses_policy_from_config() {
    let dir = temp_dir();
    write_file(
        dir.path(),
        ".caseflow/policy.yaml",
        r#"
roles: { reader: 1 }
resources: [articles]
actions: [read]
ownership:
  articles: { owner: author.id }
permissions:
  reader:
    articles: { read: own }
"#,
    );
    write_file(
        dir.path(),
        ".caseflow/config.yaml",
        "policy:\n  path: policy.yaml\n  strict: true\n",
    );

    caseflow_policy(&dir)
        .args([
            "explain",
            "--role",
            "reader",
            "--resource",
            "articles",
            "--action",
            "read",
            "--actor-id",
            "7",
            "--target",
            r#"{"author": {"id": 7}}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("allowed (ALLOWED)"))
        .stdout(predicate::str::contains("author.id = \"7\""));
}

#[test]
fn explain_rejects_malformed_target() {
    let dir = temp_dir();
    caseflow_policy(&dir)
        .args([
            "explain",
            "--role",
            "user",
            "--resource",
            "feedback",
            "--action",
            "read",
            "--target",
            "{oops",
        ])
        .assert()
        .code(64);
}

#[test]
fn matrix_json_output() {
    let dir = temp_dir();
    let output = caseflow_policy(&dir)
        .args(["--format", "json", "matrix", "--role", "super_admin"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert!(rows
        .iter()
        .any(|row| row["resource"] == "system" && row["action"] == "manage_settings"));
}

#[test]
fn missing_policy_file_is_an_io_error() {
    let dir = temp_dir();
    caseflow_policy(&dir)
        .args(["--policy", "nowhere.yaml", "matrix"])
        .assert()
        .code(4);
}

#[test]
fn strict_config_accepts_policy_flag() {
    let dir = temp_dir();
    write_file(dir.path(), ".caseflow/config.yaml", "policy:\n  strict: true\n");
    write_file(
        dir.path(),
        "policy.yaml",
        "roles: { reader: 1 }\nresources: [articles]\nactions: [read]\npermissions:\n  reader:\n    articles: { read: all }\n",
    );

    caseflow_policy(&dir)
        .args(["--policy", "policy.yaml", "matrix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reader"));
}

#[test]
fn strict_config_without_policy_file_fails() {
    let dir = temp_dir();
    write_file(dir.path(), ".caseflow/config.yaml", "policy:\n  strict: true\n");

    caseflow_policy(&dir)
        .arg("matrix")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("policy.strict"));
}
