//! Role x resource x action permission matrix.

use crate::types::{ActionName, ResourceName, Restriction, RoleName};
use std::collections::BTreeMap;

pub(crate) type ActionTable = BTreeMap<ActionName, Restriction>;
pub(crate) type ResourceTable = BTreeMap<ResourceName, ActionTable>;

/// Declared restrictions; anything not declared is [`Restriction::None`].
#[derive(Debug, Clone, Default)]
pub struct PermissionMatrix {
    entries: BTreeMap<RoleName, ResourceTable>,
}

/// One declared matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixEntry<'a> {
    pub role: &'a RoleName,
    pub resource: &'a ResourceName,
    pub action: &'a ActionName,
    pub restriction: Restriction,
}

impl PermissionMatrix {
    pub(crate) fn new(entries: BTreeMap<RoleName, ResourceTable>) -> Self {
        Self { entries }
    }

    /// Look up a cell, falling back to `NONE`.
    pub fn lookup(&self, role: &str, resource: &str, action: &str) -> Restriction {
        self.entries
            .get(role)
            .and_then(|resources| resources.get(resource))
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(Restriction::None)
    }

    #[cfg(test)]
    pub(crate) fn force(&mut self, role: &str, resource: &str, action: &str, restriction: Restriction) {
        self.entries
            .entry(RoleName::from(role))
            .or_default()
            .entry(ResourceName::from(resource))
            .or_default()
            .insert(ActionName::from(action), restriction);
    }

    /// Every declared cell, ordered by role, resource and action name.
    pub fn entries(&self) -> impl Iterator<Item = MatrixEntry<'_>> {
        self.entries.iter().flat_map(|(role, resources)| {
            resources.iter().flat_map(move |(resource, actions)| {
                actions.iter().map(move |(action, restriction)| MatrixEntry {
                    role,
                    resource,
                    action,
                    restriction: *restriction,
                })
            })
        })
    }
}
