use caseflow_authz::{Policy, PolicyDocument, PolicyError, Restriction, Violation};
use caseflow_common_config::{ConfigError, ConfigLoader};
use caseflow_test_utils::{assert_err, assert_ok, temp_dir, write_file};
use std::path::PathBuf;

fn default_policy_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("policy/default.yaml")
}

#[test]
fn shipped_policy_matches_builtin() {
    let doc: PolicyDocument = assert_ok!(ConfigLoader::load_yaml(&default_policy_path()));
    assert_eq!(doc, PolicyDocument::feedback_tracker());

    let loaded = assert_ok!(Policy::load(default_policy_path()));
    let builtin = Policy::builtin().unwrap();
    assert!(loaded.entries().eq(builtin.entries()));
}

#[test]
fn load_or_builtin_without_path() {
    let policy = assert_ok!(Policy::load_or_builtin(None));
    assert_eq!(policy.restriction("staff", "feedback", "update"), Restriction::Assigned);
}

#[test]
fn loads_custom_policy_with_env_expansion() {
    std::env::set_var("CASEFLOW_TEST_OWNER_FIELD", "author.id");
    let dir = temp_dir();
    let path = write_file(
        dir.path(),
        "policy.yaml",
        r#"
roles: { reader: 1, editor: 2 }
resources: [articles]
actions: [read, update]
ownership:
  articles: { ownerPath: "${CASEFLOW_TEST_OWNER_FIELD}" }
permissions:
  reader:
    articles: { read: ALL }
  editor:
    articles: { read: all, update: own }
"#,
    );

    let policy = assert_ok!(Policy::load(&path));
    assert_eq!(policy.restriction("editor", "articles", "update"), Restriction::Own);
    assert_eq!(
        policy.ownership().owner_path("articles").map(|p| p.as_str()),
        Some("author.id")
    );
    std::env::remove_var("CASEFLOW_TEST_OWNER_FIELD");
}

#[test]
fn invalid_policy_reports_every_violation() {
    let dir = temp_dir();
    let path = write_file(
        dir.path(),
        "policy.yaml",
        r#"
roles: { user: 1, admin: 3 }
resources: [feedback, categories]
actions: [read]
permissions:
  user:
    categories: { read: own }
  owner:
    feedback: { read: all }
"#,
    );

    let err = assert_err!(Policy::load(&path));
    let violations = err.violations();
    assert!(violations
        .iter()
        .any(|v| matches!(v, Violation::NonContiguousRank { .. })));
    assert!(violations.contains(&Violation::UndeclaredRole("owner".into())));
    assert!(violations.iter().any(|v| matches!(
        v,
        Violation::MissingOwnerPath { resource, .. } if resource.as_str() == "categories"
    )));
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = temp_dir();
    let path = write_file(
        dir.path(),
        "policy.yaml",
        "roles: { user: 1 }\nresources: []\nactions: []\ninherit: true\n",
    );
    let err = assert_err!(Policy::load(&path));
    assert!(matches!(
        err,
        PolicyError::Load(ConfigError::ParseError { .. })
    ));
}

#[test]
fn missing_policy_file() {
    let dir = temp_dir();
    let err = assert_err!(Policy::load(dir.path().join("absent.yaml")));
    assert!(matches!(err, PolicyError::Load(ConfigError::NotFound { .. })));
    assert!(err.violations().is_empty());
}
