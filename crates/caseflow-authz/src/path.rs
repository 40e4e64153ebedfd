//! Dot-separated field paths into tree-shaped records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Field path parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path `{path}` has an empty segment")]
    EmptySegment { path: String },
}

/// A parsed path such as `createdBy.id`.
///
/// Object keys are matched exactly; a purely numeric segment also indexes
/// into arrays.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: raw.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Walk the path through `target`.
    ///
    /// Returns `None` as soon as a segment is missing or the current value
    /// cannot be descended into; never panics.
    pub fn resolve<'a>(&self, target: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(target, |current, segment| match current {
            Value::Object(fields) => fields.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl std::str::FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({})", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert_eq!(FieldPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::parse("createdBy..id"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(FieldPath::parse(".id").is_err());
        assert!(FieldPath::parse("id.").is_err());
    }

    #[test]
    fn test_resolve_nested() {
        let target = json!({"createdBy": {"id": 5, "name": "ann"}});
        assert_eq!(path("createdBy.id").resolve(&target), Some(&json!(5)));
        assert_eq!(path("createdBy").resolve(&target), Some(&json!({"id": 5, "name": "ann"})));
    }

    #[test]
    fn test_resolve_missing_intermediate_is_none() {
        let target = json!({"title": "broken"});
        assert_eq!(path("createdBy.id").resolve(&target), None);

        let null_owner = json!({"createdBy": null});
        assert_eq!(path("createdBy.id").resolve(&null_owner), None);

        let scalar = json!({"createdBy": 5});
        assert_eq!(path("createdBy.id").resolve(&scalar), None);

        assert_eq!(path("a.b.c").resolve(&json!(null)), None);
        assert_eq!(path("a").resolve(&json!("text")), None);
    }

    #[test]
    fn test_resolve_array_index() {
        let target = json!({"watchers": [{"id": 1}, {"id": 2}]});
        assert_eq!(path("watchers.1.id").resolve(&target), Some(&json!(2)));
        assert_eq!(path("watchers.9.id").resolve(&target), None);
        assert_eq!(path("watchers.first.id").resolve(&target), None);
    }

    #[test]
    fn test_serde_round_trips_as_string() {
        let parsed: FieldPath = serde_json::from_str("\"assignedTo.id\"").unwrap();
        assert_eq!(parsed.segments().collect::<Vec<_>>(), vec!["assignedTo", "id"]);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"assignedTo.id\"");
        assert!(serde_json::from_str::<FieldPath>("\"\"").is_err());
    }
}
