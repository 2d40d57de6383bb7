use super::*;

use crate::{RoleReassignment, UpsertUserRoleGrant};
use warden_domain::UserRoleGrant;

impl GrantService {
    /// Assigns a role to a user, reactivating an existing grant row.
    pub async fn assign_role(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<MutationOutcome<UserRoleGrant>> {
        let user = self.require_user(input.user_id).await?;
        let role = self.require_active_role(input.role_id).await?;

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::Validation(
                "role grant expiry must lie in the future".to_owned(),
            ));
        }

        let grant = self
            .grants
            .upsert_user_role_grant(UpsertUserRoleGrant {
                user_id: user.id,
                role_id: role.id,
                assigned_by: input.assigned_by,
                expires_at: input.expires_at,
            })
            .await?;

        info!(
            user_id = %user.id,
            role = role.name.as_str(),
            expires_at = ?grant.expires_at,
            "role assigned"
        );

        let mirror = self.mirror.add_member(&role, user.id).await;
        Self::log_mirror("assign_role", &mirror);

        Ok(MutationOutcome {
            value: grant,
            mirror,
        })
    }

    /// Deactivates a user's role grant.
    pub async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<MutationOutcome<()>> {
        let role = self.require_role(role_id).await?;

        if !self
            .grants
            .deactivate_user_role_grant(user_id, role_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' has no active grant of role '{}'",
                role.name.as_str()
            )));
        }

        info!(%user_id, role = role.name.as_str(), "role revoked");

        let mirror = self.mirror.remove_member(&role, user_id).await;
        Self::log_mirror("revoke_role", &mirror);

        Ok(MutationOutcome { value: (), mirror })
    }

    /// Deletes a role, moving its holders to the fallback role first.
    pub async fn delete_role(
        &self,
        role_id: RoleId,
        actor: Option<UserId>,
    ) -> AppResult<MutationOutcome<RoleDeletion>> {
        let role = self.require_role(role_id).await?;

        if self.policy.is_protected(role.name.as_str()) {
            return Err(AppError::ProtectedResource(format!(
                "role '{}' is a system role and cannot be deleted",
                role.name.as_str()
            )));
        }

        let now = Utc::now();
        let holder_count = self
            .grants
            .list_role_holders(role.id)
            .await?
            .into_iter()
            .filter(|view| view.grant.is_effective(now, view.user.is_active, true))
            .count();

        let fallback = self
            .policy_role(self.policy.fallback_role(), self.policy.fallback_role_name())
            .await?
            .filter(|fallback| fallback.id != role.id);

        if holder_count > 0 && fallback.is_none() {
            return Err(AppError::Configuration(format!(
                "role '{}' has {holder_count} active holder(s) but fallback role '{}' is missing or inactive; create or activate it before deleting roles",
                role.name.as_str(),
                self.policy.fallback_role_name()
            )));
        }

        // Holders are read again inside the delete transaction.
        let holders = self
            .roles
            .delete_role(
                role.id,
                fallback.as_ref().map(|fallback| RoleReassignment {
                    fallback_role_id: fallback.id,
                    assigned_by: actor,
                }),
            )
            .await?;

        info!(
            role = role.name.as_str(),
            reassigned = holders.len(),
            "role deleted"
        );

        let mut mirror = self.mirror.drop_role_group(&role).await;
        let fallback = fallback.filter(|_| !holders.is_empty());
        if let Some(fallback) = &fallback {
            mirror = mirror.and(self.mirror.sync_role_status(fallback.id).await);
        }
        Self::log_mirror("delete_role", &mirror);

        Ok(MutationOutcome {
            value: RoleDeletion {
                role_id: role.id,
                role_name: role.name.as_str().to_owned(),
                fallback_role_id: fallback.map(|fallback| fallback.id),
                reassigned_user_ids: holders,
            },
            mirror,
        })
    }
}
