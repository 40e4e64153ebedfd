//! Test fixtures for Caseflow crates.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Writes `content` to `relative` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    std::fs::write(&path, content).expect("Failed to write temp file");
    path
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = write_file(dir.path(), "test_file", content);
    (dir, path)
}

/// A feedback row as the data layer would hand it to a resolver.
pub fn feedback_row(id: i64, created_by: Value, assigned_to: Value) -> Value {
    json!({
        "id": id,
        "title": format!("feedback #{id}"),
        "createdBy": created_by,
        "assignedTo": assigned_to,
    })
}

/// A handful of feedback rows owned by and assigned to actors 1 to 3.
pub fn feedback_rows() -> Vec<Value> {
    vec![
        feedback_row(10, json!(1), json!(2)),
        feedback_row(11, json!(1), Value::Null),
        feedback_row(12, json!("2"), json!(3)),
        feedback_row(13, json!(3), json!(2)),
        json!({"id": 14, "title": "imported without owner"}),
    ]
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
