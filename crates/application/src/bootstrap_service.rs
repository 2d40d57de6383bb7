//! Idempotent seeding of the default permission catalog and roles.

use std::sync::Arc;

use tracing::{info, warn};
use warden_core::AppResult;
use warden_domain::{AuditAction, PermissionCategory, PermissionName, RoleColor, RoleName};

use crate::{
    AuditEvent, AuditRepository, CreatePermissionInput, CreateRoleInput, GrantRepository,
    MirrorSyncService, PermissionRepository, RoleRepository, SyncSummary, record_committed,
};

/// Default permission: `(name, category, description)`.
pub type PermissionSeed = (&'static str, &'static str, &'static str);

/// Default role: name, color, description and granted permission names.
#[derive(Debug, Clone, Copy)]
pub struct RoleSeed {
    /// Role name.
    pub name: &'static str,
    /// Badge color.
    pub color: &'static str,
    /// Description.
    pub description: &'static str,
    /// Names of permissions granted on creation.
    pub permissions: &'static [&'static str],
}

/// Default permission catalog.
pub const DEFAULT_PERMISSIONS: &[PermissionSeed] = &[
    ("user_management", "user", "Manage user accounts"),
    ("user_view", "user", "View user accounts"),
    ("user_create", "user", "Create user accounts"),
    ("user_edit", "user", "Edit user accounts"),
    ("user_delete", "user", "Delete user accounts"),
    ("role_management", "role", "Manage roles and permissions"),
    ("role_view", "role", "View roles"),
    ("role_create", "role", "Create roles"),
    ("role_edit", "role", "Edit roles"),
    ("role_delete", "role", "Delete roles"),
    ("role_assign", "role", "Assign roles to users"),
    ("project_management", "project", "Manage projects"),
    ("project_view", "project", "View projects"),
    ("project_create", "project", "Create projects"),
    ("project_edit", "project", "Edit projects"),
    ("project_delete", "project", "Delete projects"),
    ("project_assign", "project", "Assign users to projects"),
    ("system_admin", "system", "Administer the system"),
    ("system_config", "system", "Change system settings"),
    ("report_view", "report", "View reports"),
    ("report_create", "report", "Create reports"),
    ("report_export", "report", "Export reports"),
    ("dashboard_access", "dashboard", "Open the dashboard"),
];

/// Default roles.
pub const DEFAULT_ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: "System Administrator",
        color: "#dc3545",
        description: "Full administrative access",
        permissions: &[
            "system_admin",
            "system_config",
            "user_management",
            "role_management",
            "project_management",
            "report_view",
            "report_create",
            "report_export",
            "dashboard_access",
        ],
    },
    RoleSeed {
        name: "Project Manager",
        color: "#fd7e14",
        description: "Runs projects and staffs them",
        permissions: &[
            "user_view",
            "project_management",
            "project_view",
            "project_create",
            "project_edit",
            "project_assign",
            "report_view",
            "report_create",
            "report_export",
            "dashboard_access",
        ],
    },
    RoleSeed {
        name: "Team Lead",
        color: "#ffc107",
        description: "Leads agents on assigned projects",
        permissions: &[
            "user_view",
            "project_view",
            "project_assign",
            "report_view",
            "report_create",
            "dashboard_access",
        ],
    },
    RoleSeed {
        name: "Agent",
        color: "#28a745",
        description: "Works on assigned projects",
        permissions: &["project_view", "report_view", "dashboard_access"],
    },
    RoleSeed {
        name: "Basic User",
        color: "#6c757d",
        description: "Default role for new accounts",
        permissions: &["dashboard_access"],
    },
];

/// Counts of records created by a seed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Permissions created.
    pub permissions_created: usize,
    /// Roles created.
    pub roles_created: usize,
    /// Role→permission grants created on new roles.
    pub grants_created: usize,
    /// Mirror re-sync outcome.
    pub sync: SyncSummary,
}

/// Seeds the default catalog and re-syncs the mirror.
#[derive(Clone)]
pub struct BootstrapService {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    grants: Arc<dyn GrantRepository>,
    mirror: MirrorSyncService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl BootstrapService {
    /// Creates a bootstrap service.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        grants: Arc<dyn GrantRepository>,
        mirror: MirrorSyncService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            roles,
            permissions,
            grants,
            mirror,
            audit_repository,
        }
    }

    /// Creates missing default permissions and roles.
    ///
    /// Existing records are left untouched, including the grants of roles
    /// that already exist.
    pub async fn seed(&self) -> AppResult<BootstrapReport> {
        let mut report = BootstrapReport::default();

        for (name, category, description) in DEFAULT_PERMISSIONS {
            if self.permissions.find_permission_by_name(name).await?.is_some() {
                continue;
            }

            self.permissions
                .create_permission(CreatePermissionInput {
                    name: PermissionName::new(*name)?,
                    description: Some((*description).to_owned()),
                    category: Some(PermissionCategory::new(*category)?),
                    is_active: true,
                })
                .await?;
            report.permissions_created += 1;
        }

        for seed in DEFAULT_ROLES {
            if self.roles.find_role_by_name(seed.name).await?.is_some() {
                continue;
            }

            let role = self
                .roles
                .create_role(CreateRoleInput {
                    name: RoleName::new(seed.name)?,
                    description: Some(seed.description.to_owned()),
                    color: RoleColor::new(seed.color)?,
                    is_active: true,
                })
                .await?;
            report.roles_created += 1;

            for permission_name in seed.permissions {
                let Some(permission) = self
                    .permissions
                    .find_permission_by_name(permission_name)
                    .await?
                    .filter(|permission| permission.is_active)
                else {
                    warn!(
                        role = seed.name,
                        permission = permission_name,
                        "default permission missing or inactive"
                    );
                    continue;
                };

                self.grants
                    .upsert_role_permission_grant(role.id, permission.id, None)
                    .await?;
                report.grants_created += 1;
            }
        }

        report.sync = self.mirror.sync_all().await?;

        info!(
            permissions_created = report.permissions_created,
            roles_created = report.roles_created,
            grants_created = report.grants_created,
            "default catalog seeded"
        );

        record_committed(
            self.audit_repository.as_ref(),
            AuditEvent {
                actor: None,
                action: AuditAction::CatalogSeeded,
                resource_type: "catalog".to_owned(),
                resource_id: "default".to_owned(),
                detail: Some(format!(
                    "seeded {} permission(s), {} role(s), {} grant(s)",
                    report.permissions_created, report.roles_created, report.grants_created
                )),
            },
        )
        .await;

        Ok(report)
    }
}
