//! Authorization decisions for Caseflow.
//!
//! A [`Policy`] combines three declarations that are loaded once and never
//! change afterwards:
//!
//! - the permission matrix (role x resource x action -> [`Restriction`]),
//! - the ownership registry (resource -> owner/assignee [`FieldPath`]),
//! - the role hierarchy (role -> rank).
//!
//! [`Policy::authorize`] decides single-instance requests,
//! [`Policy::generate_filter`] turns the same restriction into a
//! [`QueryFilter`] for list operations, and [`Policy::require_role`] is the
//! independent seniority gate.
//!
//! ```
//! use caseflow_authz::{Actor, Policy, QueryFilter};
//! use serde_json::json;
//!
//! let policy = Policy::builtin().unwrap();
//! let actor = Actor::new(5, "user");
//!
//! let decision = policy.authorize(&actor, "feedback", "read", Some(&json!({"createdBy": 5})));
//! assert!(decision.allowed);
//!
//! let filter = policy.generate_filter(&actor, "feedback", "read");
//! assert!(matches!(filter, QueryFilter::FieldEquals { .. }));
//! ```

pub mod document;
mod engine;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod matrix;
pub mod ownership;
pub mod path;
pub mod policy;
pub mod types;

pub use document::{actions, resources, roles, PolicyDocument};
pub use error::{PolicyError, Violation};
pub use filter::QueryFilter;
pub use hierarchy::RoleHierarchy;
pub use matrix::{MatrixEntry, PermissionMatrix};
pub use ownership::{OwnershipRegistry, OwnershipSpec};
pub use path::{FieldPath, PathError};
pub use policy::Policy;
pub use types::*;
