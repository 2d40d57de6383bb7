use super::*;

use tracing::warn;

use crate::{CreatePermissionInput, MirrorStatus, MutationOutcome, SyncSummary};
use warden_domain::{LegacyCapability, RolePermissionGrant};

impl SecurityAdminService {
    /// Lists the permission catalog.
    pub async fn list_permissions(&self, actor: &UserIdentity) -> AppResult<Vec<Permission>> {
        self.require_role_management(actor).await?;
        self.permissions.list_permissions().await
    }

    /// Lists distinct permission categories.
    pub async fn list_permission_categories(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<String>> {
        self.require_role_management(actor).await?;
        self.permissions.list_categories().await
    }

    /// Creates a permission and its mirror capability.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<MutationOutcome<Permission>> {
        self.require_role_management(actor).await?;

        let permission = self.permissions.create_permission(input).await?;
        let mirror = match self.mirror.sync_permission(permission.id).await {
            Ok(_) => MirrorStatus::Synced,
            Err(error) => {
                warn!(permission = permission.name.as_str(), %error, "capability sync failed");
                MirrorStatus::Failed(error.to_string())
            }
        };

        self.audit(
            actor,
            AuditAction::PermissionCreated,
            "permission",
            permission.id.to_string(),
            Some(format!("created permission '{}'", permission.qualified_name())),
        )
        .await;

        Ok(MutationOutcome {
            value: permission,
            mirror,
        })
    }

    /// Lists the effective permissions granted to a role.
    pub async fn list_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<Permission>> {
        self.require_role_management(actor).await?;

        let role = self.find_role(role_id).await?;
        let mut permissions: Vec<Permission> = self
            .grants
            .list_role_permission_grants(role.id)
            .await?
            .into_iter()
            .filter(|view| view.grant.is_effective(view.permission.is_active))
            .map(|view| view.permission)
            .collect();

        permissions.sort_by_key(Permission::qualified_name);
        Ok(permissions)
    }

    /// Grants a permission to a role.
    pub async fn grant_permission(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<MutationOutcome<RolePermissionGrant>> {
        self.require_role_management(actor).await?;

        let outcome = self
            .grant_service
            .grant_permission(role_id, permission_id, Some(actor.user_id()))
            .await?;

        self.audit(
            actor,
            AuditAction::PermissionGranted,
            "role_permission",
            outcome.value.id.to_string(),
            Some(format!(
                "granted permission '{permission_id}' to role '{role_id}'"
            )),
        )
        .await;

        Ok(outcome)
    }

    /// Revokes a permission from a role.
    pub async fn revoke_permission(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<MutationOutcome<()>> {
        self.require_role_management(actor).await?;

        let outcome = self
            .grant_service
            .revoke_permission(role_id, permission_id)
            .await?;

        self.audit(
            actor,
            AuditAction::PermissionRevoked,
            "role_permission",
            format!("{role_id}:{permission_id}"),
            Some(format!(
                "revoked permission '{permission_id}' from role '{role_id}'"
            )),
        )
        .await;

        Ok(outcome)
    }

    /// Ensures the mirror capability of one permission.
    pub async fn sync_permission(
        &self,
        actor: &UserIdentity,
        permission_id: PermissionId,
    ) -> AppResult<LegacyCapability> {
        self.require_role_management(actor).await?;

        let permission = self.find_permission(permission_id).await?;
        let capability = self.mirror.sync_permission(permission.id).await?;

        self.audit(
            actor,
            AuditAction::MirrorSynced,
            "permission",
            permission_id.to_string(),
            Some(format!("synced capability '{}'", capability.codename)),
        )
        .await;

        Ok(capability)
    }

    /// Re-syncs every active permission and role.
    pub async fn sync_all(&self, actor: &UserIdentity) -> AppResult<SyncSummary> {
        self.require_role_management(actor).await?;

        let summary = self.mirror.sync_all().await?;

        self.audit(
            actor,
            AuditAction::MirrorSynced,
            "mirror",
            "all".to_owned(),
            Some(format!(
                "synced {} permission(s) and {} role(s) with {} failure(s)",
                summary.permissions_synced,
                summary.roles_synced,
                summary.failures.len()
            )),
        )
        .await;

        Ok(summary)
    }
}
