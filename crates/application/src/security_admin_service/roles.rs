use super::*;

use crate::{
    AssignRoleInput, CreateRoleInput, MirrorStatus, MutationOutcome, RoleDeletion,
    RoleSyncReport, UpdateRoleInput,
};
use warden_domain::UserRoleGrant;

impl SecurityAdminService {
    /// Lists all roles.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        self.require_role_management(actor).await?;
        self.roles.list_roles().await
    }

    /// Creates a role and its mirror group.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<MutationOutcome<Role>> {
        self.require_role_management(actor).await?;

        let role = self.roles.create_role(input).await?;
        let mirror = self.mirror.sync_role_status(role.id).await;
        let role = self.find_role(role.id).await?;

        self.audit(
            actor,
            AuditAction::RoleCreated,
            "role",
            role.id.to_string(),
            Some(format!("created role '{}'", role.name.as_str())),
        )
        .await;

        Ok(MutationOutcome {
            value: role,
            mirror,
        })
    }

    /// Updates role attributes and re-syncs its group.
    ///
    /// Renaming a protected role is rejected so the protection stays attached.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<MutationOutcome<Role>> {
        self.require_role_management(actor).await?;

        let existing = self.find_role(role_id).await?;
        let policy = self.grant_service.policy();
        if policy.is_protected(existing.name.as_str()) {
            let renamed = input
                .name
                .as_ref()
                .is_some_and(|name| name.as_str() != existing.name.as_str());
            let deactivated = input.is_active == Some(false);
            if renamed || deactivated {
                return Err(AppError::ProtectedResource(format!(
                    "role '{}' is a system role and cannot be renamed or deactivated",
                    existing.name.as_str()
                )));
            }
        }

        let role = self.roles.update_role(role_id, input).await?;
        let mirror = self.mirror.sync_role_status(role.id).await;

        self.audit(
            actor,
            AuditAction::RoleUpdated,
            "role",
            role.id.to_string(),
            Some(format!("updated role '{}'", role.name.as_str())),
        )
        .await;

        Ok(MutationOutcome {
            value: role,
            mirror,
        })
    }

    /// Deletes a role, reassigning its holders to the fallback role.
    pub async fn delete_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<MutationOutcome<RoleDeletion>> {
        self.require_role_management(actor).await?;

        let outcome = self
            .grant_service
            .delete_role(role_id, Some(actor.user_id()))
            .await?;

        self.audit(
            actor,
            AuditAction::RoleDeleted,
            "role",
            role_id.to_string(),
            Some(format!(
                "deleted role '{}' and reassigned {} holder(s)",
                outcome.value.role_name,
                outcome.value.reassigned_user_ids.len()
            )),
        )
        .await;

        Ok(outcome)
    }

    /// Lists effective holders of a role, newest assignment first.
    pub async fn list_role_holders(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<RoleHolder>> {
        self.require_role_management(actor).await?;

        let role = self.find_role(role_id).await?;
        let now = Utc::now();
        let mut holders: Vec<RoleHolder> = self
            .grants
            .list_role_holders(role.id)
            .await?
            .into_iter()
            .filter(|view| view.grant.is_effective(now, view.user.is_active, role.is_active))
            .map(|view| RoleHolder {
                user_id: view.user.id,
                username: view.user.username.as_str().to_owned(),
                display_name: view.user.display_name(),
                assigned_by: view.grant.assigned_by,
                assigned_at: view.grant.assigned_at,
                expires_at: view.grant.expires_at,
            })
            .collect();

        holders.sort_by(|left, right| right.assigned_at.cmp(&left.assigned_at));
        Ok(holders)
    }

    /// Assigns a role to a user.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<MutationOutcome<UserRoleGrant>> {
        self.require_role_management(actor).await?;

        let outcome = self
            .grant_service
            .assign_role(AssignRoleInput {
                user_id,
                role_id,
                assigned_by: Some(actor.user_id()),
                expires_at,
            })
            .await?;

        self.audit(
            actor,
            AuditAction::RoleAssigned,
            "user_role",
            outcome.value.id.to_string(),
            Some(format!("assigned role '{role_id}' to user '{user_id}'")),
        )
        .await;

        Ok(outcome)
    }

    /// Revokes a role from a user.
    pub async fn revoke_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<MirrorStatus> {
        self.require_role_management(actor).await?;

        let outcome = self.grant_service.revoke_role(user_id, role_id).await?;

        self.audit(
            actor,
            AuditAction::RoleRevoked,
            "user_role",
            format!("{user_id}:{role_id}"),
            Some(format!("revoked role '{role_id}' from user '{user_id}'")),
        )
        .await;

        Ok(outcome.mirror)
    }

    /// Reconciles one role's mirror group on demand.
    pub async fn sync_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<RoleSyncReport> {
        self.require_role_management(actor).await?;

        let report = self.mirror.sync_role(role_id).await?;

        self.audit(
            actor,
            AuditAction::MirrorSynced,
            "role",
            role_id.to_string(),
            Some(format!(
                "synced group '{}' (+{} / -{} capabilities)",
                report.group.name,
                report.capabilities_added.len(),
                report.capabilities_removed.len()
            )),
        )
        .await;

        Ok(report)
    }
}
