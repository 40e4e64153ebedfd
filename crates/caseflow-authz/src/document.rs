//! Declarative policy document, as read from a policy file.

use crate::matrix::ResourceTable;
use crate::ownership::OwnershipSpec;
use crate::path::FieldPath;
use crate::types::{ActionName, ResourceName, Restriction, RoleName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource identifiers shared by the declarations and call sites.
pub mod resources {
    pub const FEEDBACK: &str = "feedback";
    pub const USERS: &str = "users";
    pub const CATEGORIES: &str = "categories";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const COMMENTS: &str = "comments";
    pub const SYSTEM: &str = "system";

    pub const ALL: &[&str] = &[FEEDBACK, USERS, CATEGORIES, NOTIFICATIONS, COMMENTS, SYSTEM];
}

/// Action identifiers.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const READ: &str = "read";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const ASSIGN: &str = "assign";
    pub const EXPORT: &str = "export";
    pub const IMPORT: &str = "import";
    pub const MANAGE_SETTINGS: &str = "manage_settings";
    pub const MANAGE_USERS: &str = "manage_users";

    pub const ALL: &[&str] = &[
        CREATE,
        READ,
        UPDATE,
        DELETE,
        ASSIGN,
        EXPORT,
        IMPORT,
        MANAGE_SETTINGS,
        MANAGE_USERS,
    ];
}

/// Role identifiers, least senior first.
pub mod roles {
    pub const USER: &str = "user";
    pub const STAFF: &str = "staff";
    pub const MANAGER: &str = "manager";
    pub const ADMIN: &str = "admin";
    pub const SUPER_ADMIN: &str = "super_admin";

    pub const ALL: &[&str] = &[USER, STAFF, MANAGER, ADMIN, SUPER_ADMIN];
}

/// Unvalidated declarations. Turn into a [`crate::Policy`] with
/// [`crate::Policy::from_document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    /// Role name to rank.
    pub roles: BTreeMap<RoleName, u32>,
    /// Declared resources.
    pub resources: Vec<ResourceName>,
    /// Declared actions.
    pub actions: Vec<ActionName>,
    /// Owner/assignee paths per resource.
    #[serde(default)]
    pub ownership: BTreeMap<ResourceName, OwnershipSpec>,
    /// role -> resource -> action -> restriction.
    #[serde(default)]
    pub permissions: BTreeMap<RoleName, ResourceTable>,
}

impl PolicyDocument {
    /// Set one matrix cell.
    pub fn grant(
        &mut self,
        role: &str,
        resource: &str,
        action: &str,
        restriction: Restriction,
    ) -> &mut Self {
        self.permissions
            .entry(RoleName::from(role))
            .or_default()
            .entry(ResourceName::from(resource))
            .or_default()
            .insert(ActionName::from(action), restriction);
        self
    }

    fn grant_many(
        &mut self,
        role: &str,
        resource: &str,
        cells: &[(&str, Restriction)],
    ) -> &mut Self {
        for (action, restriction) in cells {
            self.grant(role, resource, action, *restriction);
        }
        self
    }

    /// The feedback tracker's declarations.
    pub fn feedback_tracker() -> Self {
        use actions::*;
        use resources::{CATEGORIES, COMMENTS, FEEDBACK, NOTIFICATIONS, SYSTEM, USERS};
        use roles::{ADMIN, MANAGER, STAFF, SUPER_ADMIN, USER};
        use Restriction::{All, Assigned, Own};

        let mut doc = Self {
            roles: roles::ALL
                .iter()
                .zip(1..)
                .map(|(role, rank)| (RoleName::from(*role), rank))
                .collect(),
            resources: resources::ALL.iter().map(|r| ResourceName::from(*r)).collect(),
            actions: actions::ALL.iter().map(|a| ActionName::from(*a)).collect(),
            ownership: BTreeMap::new(),
            permissions: BTreeMap::new(),
        };

        let owned = |owner: &str| OwnershipSpec {
            owner: FieldPath::parse(owner).ok(),
            assignee: None,
        };
        doc.ownership.insert(
            FEEDBACK.into(),
            OwnershipSpec {
                owner: FieldPath::parse("createdBy").ok(),
                assignee: FieldPath::parse("assignedTo").ok(),
            },
        );
        doc.ownership.insert(USERS.into(), owned("id"));
        doc.ownership.insert(NOTIFICATIONS.into(), owned("userId"));
        doc.ownership.insert(COMMENTS.into(), owned("authorId"));

        doc.grant_many(USER, FEEDBACK, &[(CREATE, All), (READ, Own), (UPDATE, Own)])
            .grant_many(USER, USERS, &[(READ, Own), (UPDATE, Own)])
            .grant_many(USER, CATEGORIES, &[(READ, All)])
            .grant_many(USER, NOTIFICATIONS, &[(READ, Own), (UPDATE, Own), (DELETE, Own)])
            .grant_many(
                USER,
                COMMENTS,
                &[(CREATE, All), (READ, Own), (UPDATE, Own), (DELETE, Own)],
            );

        doc.grant_many(
            STAFF,
            FEEDBACK,
            &[(CREATE, All), (READ, Assigned), (UPDATE, Assigned)],
        )
        .grant_many(STAFF, USERS, &[(READ, Own), (UPDATE, Own)])
        .grant_many(STAFF, CATEGORIES, &[(READ, All)])
        .grant_many(STAFF, NOTIFICATIONS, &[(READ, Own), (UPDATE, Own), (DELETE, Own)])
        .grant_many(
            STAFF,
            COMMENTS,
            &[(CREATE, All), (READ, All), (UPDATE, Own), (DELETE, Own)],
        );

        doc.grant_many(
            MANAGER,
            FEEDBACK,
            &[
                (CREATE, All),
                (READ, All),
                (UPDATE, All),
                (ASSIGN, All),
                (EXPORT, All),
            ],
        )
        .grant_many(MANAGER, USERS, &[(READ, All), (UPDATE, Own)])
        .grant_many(MANAGER, CATEGORIES, &[(CREATE, All), (READ, All), (UPDATE, All)])
        .grant_many(MANAGER, NOTIFICATIONS, &[(READ, Own), (UPDATE, Own), (DELETE, Own)])
        .grant_many(
            MANAGER,
            COMMENTS,
            &[(CREATE, All), (READ, All), (UPDATE, Own), (DELETE, All)],
        );

        for role in [ADMIN, SUPER_ADMIN] {
            doc.grant_many(
                role,
                FEEDBACK,
                &[
                    (CREATE, All),
                    (READ, All),
                    (UPDATE, All),
                    (DELETE, All),
                    (ASSIGN, All),
                    (EXPORT, All),
                    (IMPORT, All),
                ],
            )
            .grant_many(
                role,
                USERS,
                &[
                    (CREATE, All),
                    (READ, All),
                    (UPDATE, All),
                    (DELETE, All),
                    (MANAGE_USERS, All),
                ],
            )
            .grant_many(
                role,
                CATEGORIES,
                &[(CREATE, All), (READ, All), (UPDATE, All), (DELETE, All)],
            )
            .grant_many(
                role,
                NOTIFICATIONS,
                &[(CREATE, All), (READ, Own), (UPDATE, Own), (DELETE, Own)],
            )
            .grant_many(
                role,
                COMMENTS,
                &[(CREATE, All), (READ, All), (UPDATE, All), (DELETE, All)],
            );
        }

        doc.grant(ADMIN, SYSTEM, READ, All);
        doc.grant_many(
            SUPER_ADMIN,
            SYSTEM,
            &[
                (READ, All),
                (MANAGE_SETTINGS, All),
                (MANAGE_USERS, All),
                (EXPORT, All),
                (IMPORT, All),
            ],
        );

        doc
    }
}
