//! The validated, immutable policy.

use crate::document::PolicyDocument;
use crate::error::{PolicyError, Violation};
use crate::hierarchy::RoleHierarchy;
use crate::matrix::{MatrixEntry, PermissionMatrix};
use crate::ownership::OwnershipRegistry;
use crate::types::{ActionName, ResourceName, Restriction, RoleName};
use caseflow_common_config::ConfigLoader;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Permission matrix, ownership registry and role hierarchy, validated
/// together.
///
/// There is no way to change a `Policy` once built; share it behind an
/// `Arc` for the life of the process.
#[derive(Debug, Clone)]
pub struct Policy {
    hierarchy: RoleHierarchy,
    resources: BTreeSet<ResourceName>,
    actions: BTreeSet<ActionName>,
    ownership: OwnershipRegistry,
    matrix: PermissionMatrix,
}

impl Policy {
    /// Validate a document, reporting every problem at once.
    pub fn from_document(doc: PolicyDocument) -> Result<Self, PolicyError> {
        let mut violations = Vec::new();

        let roles: BTreeSet<RoleName> = doc.roles.keys().cloned().collect();
        let hierarchy = match RoleHierarchy::new(doc.roles) {
            Ok(hierarchy) => Some(hierarchy),
            Err(found) => {
                violations.extend(found);
                None
            }
        };

        let resources = dedup(doc.resources, &mut violations, Violation::DuplicateResource);
        let actions = dedup(doc.actions, &mut violations, Violation::DuplicateAction);

        for resource in doc.ownership.keys() {
            if !resources.contains(resource) {
                violations.push(Violation::OwnershipForUndeclaredResource(resource.clone()));
            }
        }
        let ownership = OwnershipRegistry::new(doc.ownership);

        for (role, table) in &doc.permissions {
            if !roles.contains(role) {
                violations.push(Violation::UndeclaredRole(role.clone()));
            }
            for (resource, cells) in table {
                if !resources.contains(resource) {
                    violations.push(Violation::UndeclaredResource {
                        role: role.clone(),
                        resource: resource.clone(),
                    });
                }
                for (action, restriction) in cells {
                    if !actions.contains(action) {
                        violations.push(Violation::UndeclaredAction {
                            role: role.clone(),
                            resource: resource.clone(),
                            action: action.clone(),
                        });
                    }
                    match restriction {
                        Restriction::Own if ownership.owner_path(resource.as_str()).is_none() => {
                            violations.push(Violation::MissingOwnerPath {
                                role: role.clone(),
                                resource: resource.clone(),
                                action: action.clone(),
                            });
                        }
                        Restriction::Assigned
                            if ownership.assignee_path(resource.as_str()).is_none() =>
                        {
                            violations.push(Violation::MissingAssigneePath {
                                role: role.clone(),
                                resource: resource.clone(),
                                action: action.clone(),
                            });
                        }
                        _ => {}
                    }
                }
            }
        }

        match hierarchy {
            Some(hierarchy) if violations.is_empty() => {
                let policy = Self {
                    hierarchy,
                    resources,
                    actions,
                    ownership,
                    matrix: PermissionMatrix::new(doc.permissions),
                };
                debug!(
                    roles = policy.hierarchy.roles().len(),
                    resources = policy.resources.len(),
                    actions = policy.actions.len(),
                    entries = policy.matrix.entries().count(),
                    "policy validated"
                );
                Ok(policy)
            }
            _ => Err(PolicyError::Invalid { violations }),
        }
    }

    /// The feedback tracker's built-in policy.
    pub fn builtin() -> Result<Self, PolicyError> {
        Self::from_document(PolicyDocument::feedback_tracker())
    }

    /// Load and validate a YAML policy file. `${VAR}` references are
    /// expanded before parsing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let doc: PolicyDocument = ConfigLoader::load_yaml(path)?;
        let policy = Self::from_document(doc)?;
        info!(path = %path.display(), "loaded policy");
        Ok(policy)
    }

    /// Load `path` when given, otherwise fall back to the built-in policy.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, PolicyError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                info!("no policy file configured, using built-in policy");
                Self::builtin()
            }
        }
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    /// Declared roles, lowest rank first.
    pub fn roles(&self) -> &[RoleName] {
        self.hierarchy.roles()
    }

    pub fn ownership(&self) -> &OwnershipRegistry {
        &self.ownership
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceName> {
        self.resources.iter()
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionName> {
        self.actions.iter()
    }

    pub fn declares_resource(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }

    pub fn declares_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    /// Restriction for a cell; undeclared cells are `NONE`.
    pub fn restriction(&self, role: &str, resource: &str, action: &str) -> Restriction {
        self.matrix.lookup(role, resource, action)
    }

    pub fn entries(&self) -> impl Iterator<Item = MatrixEntry<'_>> {
        self.matrix.entries()
    }

    /// Overwrite a cell without validation, to exercise request-time
    /// handling of declarations that never went through boot checks.
    #[cfg(test)]
    pub(crate) fn force_cell(
        &mut self,
        role: &str,
        resource: &str,
        action: &str,
        restriction: Restriction,
    ) {
        self.matrix.force(role, resource, action, restriction);
    }
}

fn dedup<T: Ord + Clone>(
    items: Vec<T>,
    violations: &mut Vec<Violation>,
    duplicate: impl Fn(T) -> Violation,
) -> BTreeSet<T> {
    let mut seen = BTreeSet::new();
    for item in items {
        if !seen.insert(item.clone()) {
            violations.push(duplicate(item));
        }
    }
    seen
}
