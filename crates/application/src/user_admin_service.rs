//! User directory administration.

use std::sync::Arc;

use warden_core::{AppError, AppResult, UserId, UserIdentity};
use warden_domain::{AdminPermission, AuditAction, UserAccount};

use crate::{
    AccessGate, AuditEvent, AuditRepository, CreateUserInput, CreatedUser, EffectiveRoleGrant,
    GrantService, MutationOutcome, OwnedResource, UpdateUserInput, UserDirectoryRepository,
    record_committed,
};

/// Application service for the user directory.
#[derive(Clone)]
pub struct UserAdminService {
    gate: AccessGate,
    users: Arc<dyn UserDirectoryRepository>,
    grant_service: GrantService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserAdminService {
    /// Creates a user admin service.
    #[must_use]
    pub fn new(
        gate: AccessGate,
        users: Arc<dyn UserDirectoryRepository>,
        grant_service: GrantService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            gate,
            users,
            grant_service,
            audit_repository,
        }
    }

    /// Creates an account with its initial role.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<MutationOutcome<CreatedUser>> {
        self.gate
            .require_admin(actor, AdminPermission::UserManagement)
            .await?;

        let outcome = self
            .grant_service
            .create_user(input, Some(actor.user_id()))
            .await?;

        self.audit(
            actor,
            AuditAction::UserCreated,
            outcome.value.account.id,
            format!(
                "created user '{}' with role {}",
                outcome.value.account.username.as_str(),
                outcome
                    .value
                    .role
                    .as_ref()
                    .map_or_else(|| "none".to_owned(), |role| format!("'{}'", role.name.as_str()))
            ),
        )
        .await;

        Ok(outcome)
    }

    /// Applies a partial update to an account.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<MutationOutcome<UserAccount>> {
        self.gate
            .require_admin(actor, AdminPermission::UserManagement)
            .await?;

        let outcome = self.grant_service.update_user(user_id, input).await?;

        self.audit(
            actor,
            AuditAction::UserUpdated,
            user_id,
            format!(
                "updated user '{}' (active: {})",
                outcome.value.username.as_str(),
                outcome.value.is_active
            ),
        )
        .await;

        Ok(outcome)
    }

    /// Deletes an account with its grants and project assignments.
    pub async fn delete_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<MutationOutcome<UserAccount>> {
        self.gate
            .require_admin(actor, AdminPermission::UserManagement)
            .await?;

        let outcome = self.grant_service.delete_user(user_id).await?;

        self.audit(
            actor,
            AuditAction::UserDeleted,
            user_id,
            format!("deleted user '{}'", outcome.value.username.as_str()),
        )
        .await;

        Ok(outcome)
    }

    /// Lists accounts visible to the caller.
    ///
    /// Privileged callers and holders of `user_management` see everyone;
    /// other callers see only their own account.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserAccount>> {
        let account = self.gate.require_active_account(actor).await?;

        if self.sees_all_users(actor).await? {
            return self.users.list_users().await;
        }

        Ok(vec![account])
    }

    /// Loads one account; callers may load themselves or, when privileged, anyone.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserAccount> {
        if !self.sees_all_users(actor).await? {
            self.gate
                .require_object_ownership(actor, OwnedResource::User(user_id))
                .await?;
        }

        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Lists a user's effective role grants.
    pub async fn user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<EffectiveRoleGrant>> {
        let account = self.get_user(actor, user_id).await?;
        self.gate.resolver().roles_for_account(&account).await
    }

    async fn sees_all_users(&self, actor: &UserIdentity) -> AppResult<bool> {
        if self.gate.is_privileged(actor).await? {
            return Ok(true);
        }

        self.gate
            .resolver()
            .resolve_permission(actor.user_id(), AdminPermission::UserManagement.as_str())
            .await
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        user_id: UserId,
        detail: String,
    ) {
        record_committed(
            self.audit_repository.as_ref(),
            AuditEvent {
                actor: Some(actor.user_id()),
                action,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(detail),
            },
        )
        .await;
    }
}
