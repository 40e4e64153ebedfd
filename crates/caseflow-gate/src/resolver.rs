//! Target instance lookup, injected per resource.

use async_trait::async_trait;
use caseflow_authz::{FieldPath, Identifier, ResourceName};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Resolver failures. The gate treats every variant as "not found".
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no instance with this id")]
    NotFound,

    #[error("lookup failed: {0}")]
    Backend(String),

    #[error("lookup timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

/// Fetches the instance an operation targets.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Load the instance identified by `id` as a tree-shaped value.
    async fn resolve(&self, id: &str) -> Result<Value, ResolveError>;
}

/// Resolvers keyed by resource, fixed when the gate is built.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<ResourceName, Arc<dyn ResourceResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the resolver for `resource`, replacing any earlier one.
    pub fn register(
        &mut self,
        resource: impl Into<ResourceName>,
        resolver: impl ResourceResolver + 'static,
    ) {
        self.resolvers.insert(resource.into(), Arc::new(resolver));
    }

    pub fn get(&self, resource: &str) -> Option<&Arc<dyn ResourceResolver>> {
        self.resolvers.get(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceName> {
        self.resolvers.keys()
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut resources: Vec<&str> = self.resolvers.keys().map(ResourceName::as_str).collect();
        resources.sort_unstable();
        f.debug_struct("ResolverRegistry")
            .field("resources", &resources)
            .finish()
    }
}

/// Resolver over rows held in memory, keyed by an id field.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    rows: HashMap<String, Value>,
}

impl InMemoryResolver {
    /// Index `rows` by the value at `key`; rows without a usable id are
    /// skipped.
    pub fn from_rows(rows: impl IntoIterator<Item = Value>, key: &FieldPath) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| {
                let id = key.resolve(&row).and_then(Identifier::from_value)?;
                Some((id.canonical().into_owned(), row))
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl ResourceResolver for InMemoryResolver {
    async fn resolve(&self, id: &str) -> Result<Value, ResolveError> {
        self.rows.get(id).cloned().ok_or(ResolveError::NotFound)
    }
}
