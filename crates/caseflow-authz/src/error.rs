//! Policy validation errors.

use crate::types::{ActionName, ResourceName, RoleName};
use caseflow_common_config::ConfigError;
use thiserror::Error;

/// A single problem found while validating a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("no roles declared")]
    NoRoles,

    #[error("roles `{first}` and `{second}` share rank {rank}")]
    DuplicateRank {
        rank: u32,
        first: RoleName,
        second: RoleName,
    },

    #[error("role ranks must be contiguous: expected rank {expected}, found {found} (`{role}`)")]
    NonContiguousRank {
        expected: u32,
        found: u32,
        role: RoleName,
    },

    #[error("resource `{0}` is declared more than once")]
    DuplicateResource(ResourceName),

    #[error("action `{0}` is declared more than once")]
    DuplicateAction(ActionName),

    #[error("permissions reference undeclared role `{0}`")]
    UndeclaredRole(RoleName),

    #[error("permissions for `{role}` reference undeclared resource `{resource}`")]
    UndeclaredResource { role: RoleName, resource: ResourceName },

    #[error("permissions for `{role}` on `{resource}` reference undeclared action `{action}`")]
    UndeclaredAction {
        role: RoleName,
        resource: ResourceName,
        action: ActionName,
    },

    #[error("ownership declared for undeclared resource `{0}`")]
    OwnershipForUndeclaredResource(ResourceName),

    #[error("`{role}` has OWN on `{resource}`.`{action}` but `{resource}` declares no owner path")]
    MissingOwnerPath {
        role: RoleName,
        resource: ResourceName,
        action: ActionName,
    },

    #[error("`{role}` has ASSIGNED on `{resource}`.`{action}` but `{resource}` declares no assignee path")]
    MissingAssigneePath {
        role: RoleName,
        resource: ResourceName,
        action: ActionName,
    },
}

/// Policy loading and validation errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid policy ({} problem(s)): {}", violations.len(), join(violations))]
    Invalid { violations: Vec<Violation> },

    #[error("failed to load policy: {0}")]
    Load(#[from] ConfigError),
}

impl PolicyError {
    /// Violations found during validation; empty for load failures.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { violations } => violations,
            Self::Load(_) => &[],
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
