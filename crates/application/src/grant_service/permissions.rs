use super::*;

use warden_domain::{PermissionId, RolePermissionGrant};

impl GrantService {
    /// Grants an active permission to a role and re-syncs the role's group.
    pub async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> AppResult<MutationOutcome<RolePermissionGrant>> {
        let role = self.require_role(role_id).await?;
        let permission = self
            .permissions
            .find_permission(permission_id)
            .await?
            .filter(|permission| permission.is_active)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "permission '{permission_id}' does not exist or is inactive"
                ))
            })?;

        let grant = self
            .grants
            .upsert_role_permission_grant(role.id, permission.id, granted_by)
            .await?;

        info!(
            role = role.name.as_str(),
            permission = permission.name.as_str(),
            "permission granted"
        );

        let mirror = self.mirror.sync_role_status(role.id).await;
        Self::log_mirror("grant_permission", &mirror);

        Ok(MutationOutcome {
            value: grant,
            mirror,
        })
    }

    /// Deactivates a role's permission grant and re-syncs the role's group.
    pub async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<MutationOutcome<()>> {
        let role = self.require_role(role_id).await?;

        if !self
            .grants
            .deactivate_role_permission_grant(role.id, permission_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "role '{}' has no active grant of permission '{permission_id}'",
                role.name.as_str()
            )));
        }

        info!(role = role.name.as_str(), %permission_id, "permission revoked");

        let mirror = self.mirror.sync_role_status(role.id).await;
        Self::log_mirror("revoke_permission", &mirror);

        Ok(MutationOutcome { value: (), mirror })
    }
}
