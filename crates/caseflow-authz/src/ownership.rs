//! Per-resource owner and assignee relations.

use crate::path::FieldPath;
use crate::types::ResourceName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a resource records its owner and its assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnershipSpec {
    /// Path to the owning actor's id.
    #[serde(default, alias = "ownerPath", skip_serializing_if = "Option::is_none")]
    pub owner: Option<FieldPath>,
    /// Path to the assigned actor's id.
    #[serde(default, alias = "assigneePath", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<FieldPath>,
}

impl OwnershipSpec {
    pub fn owned_by(owner: FieldPath) -> Self {
        Self {
            owner: Some(owner),
            assignee: None,
        }
    }

    pub fn with_assignee(mut self, assignee: FieldPath) -> Self {
        self.assignee = Some(assignee);
        self
    }
}

/// Ownership specs keyed by resource.
#[derive(Debug, Clone, Default)]
pub struct OwnershipRegistry {
    specs: BTreeMap<ResourceName, OwnershipSpec>,
}

impl OwnershipRegistry {
    pub(crate) fn new(specs: BTreeMap<ResourceName, OwnershipSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, resource: &str) -> Option<&OwnershipSpec> {
        self.specs.get(resource)
    }

    pub fn owner_path(&self, resource: &str) -> Option<&FieldPath> {
        self.get(resource).and_then(|spec| spec.owner.as_ref())
    }

    pub fn assignee_path(&self, resource: &str) -> Option<&FieldPath> {
        self.get(resource).and_then(|spec| spec.assignee.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceName, &OwnershipSpec)> {
        self.specs.iter()
    }
}
