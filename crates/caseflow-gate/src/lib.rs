//! Request gate for Caseflow.
//!
//! Sits between a request handler and [`caseflow_authz::Policy`]:
//!
//! 1. no actor means [`GateError::Unauthenticated`];
//! 2. instance-scoped operations load their target through the
//!    [`ResourceResolver`] registered for the resource, and a lookup that
//!    fails, times out or is cancelled counts as not found;
//! 3. the policy decides, and denials keep their reason code;
//! 4. list operations get the [`QueryFilter`](caseflow_authz::QueryFilter)
//!    the data layer must apply.

pub mod audit;
pub mod error;
pub mod extract;
pub mod gate;
pub mod resolver;
mod response;

pub use audit::AuthzAuditEvent;
pub use error::{GateError, GateResult};
pub use extract::{Authenticated, MaybeAuthenticated};
pub use gate::{GateBuildError, Grant, Operation, RequestGate, RequestGateBuilder, Scope};
pub use resolver::{InMemoryResolver, ResolveError, ResolverRegistry, ResourceResolver};
