//! Tracing spans for authorization work.

use tracing::{field, info_span, Span};

/// Span covering one gate check.
pub fn authz_span(resource: &str, action: &str) -> Span {
    info_span!("authz", resource = %resource, action = %action, error = field::Empty)
}

/// Span covering one resource lookup.
pub fn resolver_span(resource: &str, id: &str) -> Span {
    info_span!("resolve", resource = %resource, id = %id, error = field::Empty)
}

/// Record an error on the current span.
///
/// Only spans that declare an `error` field keep the value.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", field::display(error));
}
