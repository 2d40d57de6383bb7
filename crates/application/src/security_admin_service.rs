use std::sync::Arc;

use chrono::{DateTime, Utc};
use warden_core::{AppError, AppResult, UserId, UserIdentity};
use warden_domain::{AdminPermission, AuditAction, Permission, PermissionId, Role, RoleId};

use crate::{
    AccessGate, AuditEvent, AuditRepository, GrantRepository, GrantService, MirrorSyncService,
    PermissionRepository, RoleRepository, record_committed,
};

mod permissions;
mod roles;

/// Effective holder of a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHolder {
    /// Holder account.
    pub user_id: UserId,
    /// Holder login name.
    pub username: String,
    /// Holder display name.
    pub display_name: String,
    /// Granting actor.
    pub assigned_by: Option<UserId>,
    /// Latest assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Application service for role and permission administration.
#[derive(Clone)]
pub struct SecurityAdminService {
    gate: AccessGate,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    grants: Arc<dyn GrantRepository>,
    grant_service: GrantService,
    mirror: MirrorSyncService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a security admin service.
    #[must_use]
    pub fn new(
        gate: AccessGate,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        grants: Arc<dyn GrantRepository>,
        grant_service: GrantService,
        mirror: MirrorSyncService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            gate,
            roles,
            permissions,
            grants,
            grant_service,
            mirror,
            audit_repository,
        }
    }

    async fn require_role_management(&self, actor: &UserIdentity) -> AppResult<()> {
        self.gate
            .require_admin(actor, AdminPermission::RoleManagement)
            .await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.permissions
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' does not exist"))
            })
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: Option<String>,
    ) {
        record_committed(
            self.audit_repository.as_ref(),
            AuditEvent {
                actor: Some(actor.user_id()),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail,
            },
        )
        .await;
    }
}
