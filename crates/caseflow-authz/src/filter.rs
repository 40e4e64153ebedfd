//! Storage-agnostic row filters for list operations.

use crate::engine::{Resolution, Scope};
use crate::path::FieldPath;
use crate::policy::Policy;
use crate::types::{Actor, Decision, Identifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which rows a list operation may return.
///
/// The data layer translates this into its own predicate form. `None` must
/// become a query that returns zero rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryFilter {
    /// No predicate.
    Any,
    /// Equality on a possibly nested field.
    FieldEquals { path: FieldPath, value: Identifier },
    /// Matches nothing.
    None,
}

impl QueryFilter {
    /// Evaluate the filter against an in-memory row, using the same
    /// canonical id equality as [`Policy::authorize`].
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::FieldEquals { path, value } => path
                .resolve(row)
                .is_some_and(|field| value.matches_value(field)),
            Self::None => false,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn matches_nothing(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("ANY"),
            Self::FieldEquals { path, value } => write!(f, "{path} = {value:?}"),
            Self::None => f.write_str("NONE"),
        }
    }
}

impl Policy {
    /// Filter for listing `resource` under `action`.
    ///
    /// Shares restriction resolution with [`Policy::authorize`], so a filter
    /// never admits a row that a per-instance check would deny.
    pub fn generate_filter(&self, actor: &Actor, resource: &str, action: &str) -> QueryFilter {
        filter_for(actor, self.resolve(actor, resource, action))
    }

    /// Decision and filter for a list operation.
    ///
    /// Row-level restrictions are allowed here because the filter, not a
    /// target instance, carries the ownership check.
    pub fn authorize_collection(
        &self,
        actor: &Actor,
        resource: &str,
        action: &str,
    ) -> (Decision, QueryFilter) {
        let resolution = self.resolve(actor, resource, action);
        let decision = match resolution.scope {
            Scope::Denied(code) => Decision::deny(resolution.restriction, code),
            Scope::Unrestricted | Scope::Field { .. } => Decision::allow(resolution.restriction),
        };
        (decision, filter_for(actor, resolution))
    }
}

fn filter_for(actor: &Actor, resolution: Resolution<'_>) -> QueryFilter {
    match resolution.scope {
        Scope::Unrestricted => QueryFilter::Any,
        Scope::Field { path, .. } => QueryFilter::FieldEquals {
            path: path.clone(),
            value: actor.id.clone(),
        },
        Scope::Denied(_) => QueryFilter::None,
    }
}
