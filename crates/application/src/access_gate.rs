//! Allow/deny decisions for authenticated identities.

use std::sync::Arc;

use tracing::debug;
use warden_core::{AppError, AppResult, UserId, UserIdentity};
use warden_domain::{AdminPermission, ProjectId, UserAccount};

use crate::{PermissionResolver, ProjectRepository};

const INSUFFICIENT_PERMISSION: &str = "insufficient permission";

/// Resource subject to object-level ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    /// Owned by agents with an active assignment.
    Project(ProjectId),
    /// Owned by the account itself.
    User(UserId),
}

/// Allow/deny decisions composed from resolver output and account overrides.
#[derive(Clone)]
pub struct AccessGate {
    resolver: PermissionResolver,
    projects: Arc<dyn ProjectRepository>,
}

impl AccessGate {
    /// Creates a gate.
    #[must_use]
    pub fn new(resolver: PermissionResolver, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { resolver, projects }
    }

    /// Returns the underlying resolver.
    #[must_use]
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Fails with `Unauthenticated` when no identity is present.
    pub fn require_authenticated(identity: Option<&UserIdentity>) -> AppResult<&UserIdentity> {
        identity.ok_or_else(|| AppError::Unauthenticated("authentication required".to_owned()))
    }

    /// Fails with `Forbidden` unless the identity holds `permission_name`.
    pub async fn require_permission(
        &self,
        identity: &UserIdentity,
        permission_name: &str,
    ) -> AppResult<()> {
        if self
            .resolver
            .resolve_permission(identity.user_id(), permission_name)
            .await?
        {
            return Ok(());
        }

        debug!(
            user_id = %identity.user_id(),
            permission = permission_name,
            "access denied"
        );
        Err(AppError::Forbidden(INSUFFICIENT_PERMISSION.to_owned()))
    }

    /// Shorthand for administrative capabilities.
    pub async fn require_admin(
        &self,
        identity: &UserIdentity,
        permission: AdminPermission,
    ) -> AppResult<()> {
        self.require_permission(identity, permission.as_str()).await
    }

    /// Loads the caller's account, failing with `Forbidden` when it is unknown or inactive.
    pub async fn require_active_account(&self, identity: &UserIdentity) -> AppResult<UserAccount> {
        match self.resolver.find_account(identity.user_id()).await? {
            Some(account) if account.is_active => Ok(account),
            _ => {
                debug!(user_id = %identity.user_id(), "inactive or unknown account denied");
                Err(AppError::Forbidden(INSUFFICIENT_PERMISSION.to_owned()))
            }
        }
    }

    /// Fails with `Forbidden` unless the identity owns the resource or is privileged.
    pub async fn require_object_ownership(
        &self,
        identity: &UserIdentity,
        resource: OwnedResource,
    ) -> AppResult<()> {
        let account = self.require_active_account(identity).await?;

        if account.is_privileged() {
            return Ok(());
        }

        let owned = match resource {
            OwnedResource::User(user_id) => user_id == account.id,
            OwnedResource::Project(project_id) => self
                .projects
                .find_assignment(project_id, account.id)
                .await?
                .is_some_and(|assignment| assignment.is_active),
        };

        if owned {
            return Ok(());
        }

        debug!(user_id = %account.id, ?resource, "ownership check denied");
        Err(AppError::Forbidden(INSUFFICIENT_PERMISSION.to_owned()))
    }

    /// Returns whether the identity is an active superuser or staff account.
    pub async fn is_privileged(&self, identity: &UserIdentity) -> AppResult<bool> {
        Ok(self
            .resolver
            .find_account(identity.user_id())
            .await?
            .is_some_and(|account| account.is_privileged()))
    }
}

#[cfg(test)]
mod tests;
