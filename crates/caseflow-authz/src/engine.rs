//! Decision engine: matrix check, row-level ownership and the role gate.

use crate::path::FieldPath;
use crate::policy::Policy;
use crate::types::{Actor, Decision, ReasonCode, Restriction, RoleDecision};
use serde_json::Value;
use tracing::{debug, error};

/// How a resolved restriction constrains instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope<'p> {
    /// Every instance.
    Unrestricted,
    /// Instances whose field at the path equals the actor id.
    Field {
        path: &'p FieldPath,
        mismatch: ReasonCode,
    },
    /// No instance.
    Denied(ReasonCode),
}

/// Restriction for a request together with what it means for instances.
///
/// Both [`Policy::authorize`] and [`Policy::generate_filter`] derive their
/// answer from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolution<'p> {
    pub restriction: Restriction,
    pub scope: Scope<'p>,
}

impl Policy {
    pub(crate) fn resolve(&self, actor: &Actor, resource: &str, action: &str) -> Resolution<'_> {
        let restriction = self.restriction(actor.role.as_str(), resource, action);
        let ownership = self.ownership();

        let scope = match restriction {
            Restriction::None => Scope::Denied(ReasonCode::ForbiddenNoPermission),
            Restriction::All => Scope::Unrestricted,
            Restriction::Own => match ownership.owner_path(resource) {
                Some(path) => Scope::Field {
                    path,
                    mismatch: ReasonCode::ForbiddenNotOwner,
                },
                None => Scope::Denied(ReasonCode::MisconfiguredOwnership),
            },
            Restriction::Assigned => match ownership.assignee_path(resource) {
                Some(path) => Scope::Field {
                    path,
                    mismatch: ReasonCode::ForbiddenNotAssigned,
                },
                None => Scope::Denied(ReasonCode::MisconfiguredOwnership),
            },
        };

        if scope == Scope::Denied(ReasonCode::MisconfiguredOwnership) {
            error!(
                role = %actor.role,
                resource,
                action,
                restriction = %restriction,
                "row-level restriction declared without a matching ownership path"
            );
        }

        Resolution { restriction, scope }
    }

    /// Decide whether `actor` may perform `action` on `resource`.
    ///
    /// `target` is only consulted for `OWN` and `ASSIGNED` restrictions. The
    /// actor id is compared with the target's field by canonical equality,
    /// so `5` and `"5"` match. Never panics and never allows on an error
    /// path.
    pub fn authorize(
        &self,
        actor: &Actor,
        resource: &str,
        action: &str,
        target: Option<&Value>,
    ) -> Decision {
        let Resolution { restriction, scope } = self.resolve(actor, resource, action);

        let decision = match scope {
            Scope::Unrestricted => Decision::allow(restriction),
            Scope::Denied(code) => Decision::deny(restriction, code),
            Scope::Field { path, mismatch } => match target {
                None => Decision::deny(restriction, ReasonCode::TargetRequired),
                Some(target) => {
                    let matched = path
                        .resolve(target)
                        .is_some_and(|value| actor.id.matches_value(value));
                    if matched {
                        Decision::allow(restriction)
                    } else {
                        Decision::deny(restriction, mismatch)
                    }
                }
            },
        };

        debug!(
            actor_id = %actor.id,
            role = %actor.role,
            resource,
            action,
            restriction = %decision.restriction,
            code = %decision.code,
            "authorization decided"
        );
        decision
    }

    /// Coarse seniority check: allowed iff the actor's rank is at least the
    /// rank of `min_role`. Ignores the permission matrix entirely.
    pub fn require_role(&self, actor: &Actor, min_role: &str) -> RoleDecision {
        match self.hierarchy().at_least(actor.role.as_str(), min_role) {
            Some(true) => RoleDecision {
                allowed: true,
                code: ReasonCode::Allowed,
            },
            Some(false) => RoleDecision {
                allowed: false,
                code: ReasonCode::ForbiddenInsufficientRole,
            },
            None => {
                if !self.hierarchy().contains(min_role) {
                    error!(min_role, "role gate references an undeclared role");
                }
                RoleDecision {
                    allowed: false,
                    code: ReasonCode::UnknownRole,
                }
            }
        }
    }
}
