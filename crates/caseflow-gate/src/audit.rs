//! Authorization audit logging.

use caseflow_authz::{Actor, ReasonCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

/// One gate decision, as written to the log.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzAuditEvent {
    pub timestamp: DateTime<Utc>,
    pub actor_id: Option<String>,
    pub role: Option<String>,
    pub resource: String,
    pub action: String,
    pub resource_id: Option<String>,
    pub granted: bool,
    pub code: String,
}

impl AuthzAuditEvent {
    pub fn new(
        actor: Option<&Actor>,
        resource: &str,
        action: &str,
        resource_id: Option<&str>,
        granted: bool,
        code: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            actor_id: actor.map(|a| a.id.to_string()),
            role: actor.map(|a| a.role.to_string()),
            resource: resource.to_string(),
            action: action.to_string(),
            resource_id: resource_id.map(String::from),
            granted,
            code: code.to_string(),
        }
    }

    /// Emit the event. Grants log at debug unless `grants_at_info` is set.
    pub fn log(&self, grants_at_info: bool) {
        if self.granted {
            if grants_at_info {
                info!(
                    event = "authz_granted",
                    actor_id = ?self.actor_id,
                    role = ?self.role,
                    resource = %self.resource,
                    action = %self.action,
                    resource_id = ?self.resource_id,
                    "Authorization granted"
                );
            } else {
                debug!(
                    event = "authz_granted",
                    actor_id = ?self.actor_id,
                    resource = %self.resource,
                    action = %self.action,
                    resource_id = ?self.resource_id,
                    "Authorization granted"
                );
            }
        } else if is_configuration_code(&self.code) {
            error!(
                event = "authz_misconfigured",
                actor_id = ?self.actor_id,
                role = ?self.role,
                resource = %self.resource,
                action = %self.action,
                code = %self.code,
                "Authorization failed on configuration"
            );
        } else {
            info!(
                event = "authz_denied",
                actor_id = ?self.actor_id,
                role = ?self.role,
                resource = %self.resource,
                action = %self.action,
                resource_id = ?self.resource_id,
                code = %self.code,
                "Authorization denied"
            );
        }
    }
}

fn is_configuration_code(code: &str) -> bool {
    code == ReasonCode::MisconfiguredOwnership.as_str()
        || code == ReasonCode::UnknownRole.as_str()
        || code == "INTERNAL_ENGINE_ERROR"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fields() {
        let actor = Actor::new(7, "staff");
        let event = AuthzAuditEvent::new(
            Some(&actor),
            "feedback",
            "update",
            Some("42"),
            false,
            ReasonCode::ForbiddenNotAssigned.as_str(),
        );
        assert_eq!(event.actor_id.as_deref(), Some("7"));
        assert_eq!(event.role.as_deref(), Some("staff"));
        assert_eq!(event.code, "FORBIDDEN_NOT_ASSIGNED");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["resource_id"], "42");
        assert_eq!(json["granted"], false);
        event.log(false);
    }

    #[test]
    fn test_anonymous_event() {
        let event = AuthzAuditEvent::new(None, "feedback", "read", None, false, "UNAUTHENTICATED");
        assert!(event.actor_id.is_none());
        assert!(!is_configuration_code(&event.code));
        assert!(is_configuration_code("UNKNOWN_ROLE"));
    }
}
