//! Actor extractors for axum handlers.
//!
//! The authentication layer is expected to insert an [`Actor`] into the
//! request extensions; these extractors only read it back.

use crate::error::GateError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use caseflow_authz::Actor;

/// Extractor for the authenticated actor (required).
#[derive(Debug, Clone)]
pub struct Authenticated(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(Authenticated)
            .ok_or(GateError::Unauthenticated)
    }
}

/// Extractor for an optional actor, for routes that pass it to the gate.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Actor>);

impl MaybeAuthenticated {
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthenticated(parts.extensions.get::<Actor>().cloned()))
    }
}
