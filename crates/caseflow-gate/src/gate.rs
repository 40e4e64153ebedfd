//! Request gate: resolves targets, asks the policy, maps the outcome.

use crate::audit::AuthzAuditEvent;
use crate::error::{GateError, GateResult};
use crate::resolver::{ResolveError, ResolverRegistry, ResourceResolver};
use caseflow_authz::{
    ActionName, Actor, Decision, Policy, QueryFilter, ReasonCode, ResourceName,
};
use caseflow_common_config::GateConfig;
use caseflow_common_log::spans::{authz_span, record_error, resolver_span};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn, Instrument};

/// How an operation relates to stored instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No existing instance is involved, e.g. `create`.
    Unscoped,
    /// A single instance. When `required`, a failed lookup is a 404.
    Instance { id: Option<String>, required: bool },
    /// A list of instances, narrowed by a [`QueryFilter`].
    Collection,
}

/// A protected operation as the gate sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub resource: ResourceName,
    pub action: ActionName,
    pub scope: Scope,
}

impl Operation {
    pub fn new(resource: impl Into<ResourceName>, action: impl Into<ActionName>, scope: Scope) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope,
        }
    }

    pub fn create(resource: impl Into<ResourceName>) -> Self {
        Self::new(resource, "create", Scope::Unscoped)
    }

    /// Operation on one instance that must exist.
    pub fn instance(
        resource: impl Into<ResourceName>,
        action: impl Into<ActionName>,
        id: impl ToString,
    ) -> Self {
        Self::new(
            resource,
            action,
            Scope::Instance {
                id: Some(id.to_string()),
                required: true,
            },
        )
    }

    /// Operation whose target may be absent or fail to load.
    pub fn optional_instance(
        resource: impl Into<ResourceName>,
        action: impl Into<ActionName>,
        id: Option<String>,
    ) -> Self {
        Self::new(resource, action, Scope::Instance { id, required: false })
    }

    pub fn list(resource: impl Into<ResourceName>, action: impl Into<ActionName>) -> Self {
        Self::new(resource, action, Scope::Collection)
    }

    fn instance_id(&self) -> Option<&str> {
        match &self.scope {
            Scope::Instance { id, .. } => id.as_deref(),
            _ => None,
        }
    }
}

/// What a successful check hands to the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub decision: Decision,
    /// The resolved instance, when one was loaded.
    pub target: Option<Value>,
    /// Set for list operations; must be applied verbatim by the data layer.
    pub filter: Option<QueryFilter>,
}

/// Gate construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateBuildError {
    #[error("resolver registered for undeclared resource `{0}`")]
    UndeclaredResource(ResourceName),

    #[error("resolver timeout must be greater than zero")]
    ZeroTimeout,
}

/// Wires resolvers to a validated [`Policy`].
#[derive(Debug, Clone)]
pub struct RequestGate {
    policy: Arc<Policy>,
    resolvers: ResolverRegistry,
    resolver_timeout: Duration,
    audit_grants: bool,
}

impl RequestGate {
    pub fn builder(policy: Arc<Policy>) -> RequestGateBuilder {
        RequestGateBuilder::new(policy)
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn resolver_timeout(&self) -> Duration {
        self.resolver_timeout
    }

    /// Run the full gate for `op`.
    ///
    /// Every failure path returns an error; nothing short of an engine
    /// allow produces a [`Grant`].
    pub async fn check(&self, actor: Option<&Actor>, op: &Operation) -> GateResult<Grant> {
        let span = authz_span(op.resource.as_str(), op.action.as_str());
        let result = self.check_inner(actor, op).instrument(span.clone()).await;

        let _entered = span.enter();
        let code = match &result {
            Ok(grant) => grant.decision.code.as_str(),
            Err(err) => err.error_code(),
        };
        AuthzAuditEvent::new(
            actor,
            op.resource.as_str(),
            op.action.as_str(),
            op.instance_id(),
            result.is_ok(),
            code,
        )
        .log(self.audit_grants);

        result
    }

    async fn check_inner(&self, actor: Option<&Actor>, op: &Operation) -> GateResult<Grant> {
        let actor = actor.ok_or(GateError::Unauthenticated)?;

        let (resource, action) = (op.resource.as_str(), op.action.as_str());

        match &op.scope {
            Scope::Unscoped => {
                let decision = self.evaluate(|p| p.authorize(actor, resource, action, None))?;
                finish(decision, None, None)
            }
            Scope::Collection => {
                let (decision, filter) =
                    self.evaluate(|p| p.authorize_collection(actor, resource, action))?;
                finish(decision, None, Some(filter))
            }
            Scope::Instance { id, required } => {
                let target = match id {
                    Some(id) => self.load_target(&op.resource, id, *required).await?,
                    None if *required => {
                        return Err(GateError::ResourceNotFound {
                            resource: op.resource.clone(),
                            id: None,
                        })
                    }
                    None => None,
                };
                let decision =
                    self.evaluate(|p| p.authorize(actor, resource, action, target.as_ref()))?;
                finish(decision, target, None)
            }
        }
    }

    /// Resolve a target. Lookup failures, timeouts and cancellation all
    /// count as "not found".
    async fn load_target(
        &self,
        resource: &ResourceName,
        id: &str,
        required: bool,
    ) -> GateResult<Option<Value>> {
        let Some(resolver) = self.resolvers.get(resource.as_str()) else {
            debug!(resource = %resource, "no resolver registered; checking without a target");
            return Ok(None);
        };

        match self.resolve_with_timeout(resolver.as_ref(), resource, id).await {
            Ok(value) => Ok(Some(value)),
            Err(_) if !required => Ok(None),
            Err(_) => Err(GateError::ResourceNotFound {
                resource: resource.clone(),
                id: Some(id.to_string()),
            }),
        }
    }

    async fn resolve_with_timeout(
        &self,
        resolver: &dyn ResourceResolver,
        resource: &ResourceName,
        id: &str,
    ) -> Result<Value, ResolveError> {
        let span = resolver_span(resource.as_str(), id);
        let lookup = tokio::time::timeout(self.resolver_timeout, resolver.resolve(id));

        match lookup.instrument(span.clone()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                let _entered = span.enter();
                record_error(&err);
                debug!(error = %err, "target lookup failed");
                Err(err)
            }
            Err(_) => {
                let _entered = span.enter();
                warn!(
                    timeout_ms = self.resolver_timeout.as_millis() as u64,
                    "target lookup timed out"
                );
                Err(ResolveError::TimedOut(self.resolver_timeout))
            }
        }
    }

    /// Run a pure policy call, turning a panic into an internal error.
    fn evaluate<T>(&self, f: impl FnOnce(&Policy) -> T) -> GateResult<T> {
        catch_unwind(AssertUnwindSafe(|| f(&self.policy))).map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "policy evaluation panicked".to_string());
            GateError::Internal(message)
        })
    }

    /// Seniority gate for routes that only need "at least `min_role`".
    pub fn require_role(&self, actor: Option<&Actor>, min_role: &str) -> GateResult<()> {
        let actor = actor.ok_or(GateError::Unauthenticated)?;
        let decision = self.evaluate(|p| p.require_role(actor, min_role))?;

        if decision.allowed {
            return Ok(());
        }
        // An undeclared minimum is a wiring bug; an undeclared actor role is
        // just a caller without standing.
        if decision.code == ReasonCode::UnknownRole && !self.policy.hierarchy().contains(min_role) {
            return Err(GateError::Misconfigured {
                code: decision.code,
            });
        }
        Err(GateError::Forbidden {
            code: decision.code,
        })
    }
}

fn finish(decision: Decision, target: Option<Value>, filter: Option<QueryFilter>) -> GateResult<Grant> {
    if decision.allowed {
        Ok(Grant {
            decision,
            target,
            filter,
        })
    } else {
        Err(GateError::from_denial(decision.code))
    }
}

/// Builder for [`RequestGate`].
pub struct RequestGateBuilder {
    policy: Arc<Policy>,
    resolvers: ResolverRegistry,
    resolver_timeout: Duration,
    audit_grants: bool,
}

impl RequestGateBuilder {
    fn new(policy: Arc<Policy>) -> Self {
        let defaults = GateConfig::default();
        Self {
            policy,
            resolvers: ResolverRegistry::new(),
            resolver_timeout: Duration::from_millis(defaults.resolver_timeout_ms),
            audit_grants: defaults.audit_grants,
        }
    }

    /// Apply the `gate` section of the config file.
    pub fn config(mut self, config: &GateConfig) -> Self {
        self.resolver_timeout = Duration::from_millis(config.resolver_timeout_ms);
        self.audit_grants = config.audit_grants;
        self
    }

    pub fn resolver(
        mut self,
        resource: impl Into<ResourceName>,
        resolver: impl ResourceResolver + 'static,
    ) -> Self {
        self.resolvers.register(resource, resolver);
        self
    }

    pub fn resolver_timeout(mut self, timeout: Duration) -> Self {
        self.resolver_timeout = timeout;
        self
    }

    pub fn audit_grants(mut self, enabled: bool) -> Self {
        self.audit_grants = enabled;
        self
    }

    /// Validate the wiring against the policy's declarations.
    pub fn build(self) -> Result<RequestGate, GateBuildError> {
        if self.resolver_timeout.is_zero() {
            return Err(GateBuildError::ZeroTimeout);
        }
        let mut registered: Vec<&ResourceName> = self.resolvers.resources().collect();
        registered.sort();
        if let Some(undeclared) = registered
            .into_iter()
            .find(|r| !self.policy.declares_resource(r.as_str()))
        {
            return Err(GateBuildError::UndeclaredResource(undeclared.clone()));
        }

        Ok(RequestGate {
            policy: self.policy,
            resolvers: self.resolvers,
            resolver_timeout: self.resolver_timeout,
            audit_grants: self.audit_grants,
        })
    }
}
