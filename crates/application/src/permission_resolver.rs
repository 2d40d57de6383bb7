//! Effective permission and role resolution.
//!
//! Account-level rules run first, in priority order. Grants are read through
//! the repository ports and filtered here, against the current instant, so
//! an expired or deactivated grant behaves exactly like an absent one.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use warden_core::{AppResult, UserId};
use warden_domain::{PermissionRef, RoleId, UserAccount};

use crate::{GrantRepository, UserDirectoryRepository, UserRoleGrantView};

/// Effective user→role grant exposed at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveRoleGrant {
    /// Granted role.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
    /// Role description.
    pub description: Option<String>,
    /// Role badge color.
    pub color: String,
    /// Granting actor.
    pub assigned_by: Option<UserId>,
    /// Latest assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<UserRoleGrantView> for EffectiveRoleGrant {
    fn from(view: UserRoleGrantView) -> Self {
        Self {
            role_id: view.role.id,
            role_name: view.role.name.as_str().to_owned(),
            description: view.role.description,
            color: view.role.color.as_str().to_owned(),
            assigned_by: view.grant.assigned_by,
            assigned_at: view.grant.assigned_at,
            expires_at: view.grant.expires_at,
        }
    }
}

/// Account-level rule that can settle a point decision before grants are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountRule {
    DenyInactive,
    AllowPrivileged,
}

const ACCOUNT_RULES: [AccountRule; 2] = [AccountRule::DenyInactive, AccountRule::AllowPrivileged];

impl AccountRule {
    fn decide(self, account: &UserAccount) -> Option<bool> {
        match self {
            Self::DenyInactive => (!account.is_active).then_some(false),
            Self::AllowPrivileged => account.is_privileged().then_some(true),
        }
    }
}

fn account_decision(account: &UserAccount) -> Option<bool> {
    ACCOUNT_RULES
        .iter()
        .find_map(|rule| rule.decide(account))
}

/// Computes effective permissions and role memberships.
#[derive(Clone)]
pub struct PermissionResolver {
    users: Arc<dyn UserDirectoryRepository>,
    grants: Arc<dyn GrantRepository>,
}

impl PermissionResolver {
    /// Creates a resolver over the directory and grant ports.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDirectoryRepository>,
        grants: Arc<dyn GrantRepository>,
    ) -> Self {
        Self { users, grants }
    }

    /// Loads the current account state for a user.
    pub async fn find_account(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        self.users.find_user(user_id).await
    }

    /// Returns whether the user holds `permission_name` (`name` or `category.name`).
    ///
    /// Unknown and inactive users resolve to `false`. Active superuser and
    /// staff accounts resolve to `true` without consulting grants.
    pub async fn resolve_permission(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<bool> {
        let reference = PermissionRef::parse(permission_name)?;

        let Some(account) = self.users.find_user(user_id).await? else {
            debug!(%user_id, permission = %reference, "permission denied for unknown user");
            return Ok(false);
        };

        self.account_holds(&account, &reference).await
    }

    /// Evaluates a permission reference for an already loaded account.
    pub async fn account_holds(
        &self,
        account: &UserAccount,
        reference: &PermissionRef,
    ) -> AppResult<bool> {
        if let Some(decision) = account_decision(account) {
            debug!(user_id = %account.id, permission = %reference, decision, "account rule applied");
            return Ok(decision);
        }

        for role_grant in self.effective_role_grants(account, Utc::now()).await? {
            let permission_grants = self
                .grants
                .list_role_permission_grants(role_grant.role.id)
                .await?;

            let matched = permission_grants.iter().any(|view| {
                view.grant.is_effective(view.permission.is_active)
                    && reference.matches(&view.permission)
            });

            if matched {
                debug!(
                    user_id = %account.id,
                    permission = %reference,
                    role = role_grant.role.name.as_str(),
                    "permission granted through role"
                );
                return Ok(true);
            }
        }

        debug!(user_id = %account.id, permission = %reference, "permission not granted");
        Ok(false)
    }

    /// Lists effective role grants of a user, newest assignment first.
    pub async fn resolve_roles(&self, user_id: UserId) -> AppResult<Vec<EffectiveRoleGrant>> {
        let Some(account) = self.users.find_user(user_id).await? else {
            return Ok(Vec::new());
        };

        self.roles_for_account(&account).await
    }

    /// Lists effective role grants of a loaded account, newest assignment first.
    pub async fn roles_for_account(
        &self,
        account: &UserAccount,
    ) -> AppResult<Vec<EffectiveRoleGrant>> {
        Ok(self
            .effective_role_grants(account, Utc::now())
            .await?
            .into_iter()
            .map(EffectiveRoleGrant::from)
            .collect())
    }

    /// Returns whether the user effectively holds the named role.
    ///
    /// Membership has no superuser override.
    pub async fn has_role(&self, user_id: UserId, role_name: &str) -> AppResult<bool> {
        let Some(account) = self.users.find_user(user_id).await? else {
            return Ok(false);
        };

        Ok(self
            .effective_role_grants(&account, Utc::now())
            .await?
            .iter()
            .any(|view| view.role.name.as_str() == role_name))
    }

    /// Returns the qualified names of every effectively granted permission.
    pub async fn effective_permissions(&self, user_id: UserId) -> AppResult<BTreeSet<String>> {
        let Some(account) = self.users.find_user(user_id).await? else {
            return Ok(BTreeSet::new());
        };

        self.permissions_for_account(&account).await
    }

    /// Returns the qualified permission names granted to a loaded account.
    ///
    /// Only grants count; the superuser/staff override applies to point
    /// decisions and not to this set.
    pub async fn permissions_for_account(
        &self,
        account: &UserAccount,
    ) -> AppResult<BTreeSet<String>> {
        let mut permissions = BTreeSet::new();

        for role_grant in self.effective_role_grants(account, Utc::now()).await? {
            let permission_grants = self
                .grants
                .list_role_permission_grants(role_grant.role.id)
                .await?;

            permissions.extend(
                permission_grants
                    .iter()
                    .filter(|view| view.grant.is_effective(view.permission.is_active))
                    .map(|view| view.permission.qualified_name()),
            );
        }

        Ok(permissions)
    }

    async fn effective_role_grants(
        &self,
        account: &UserAccount,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserRoleGrantView>> {
        if !account.is_active {
            return Ok(Vec::new());
        }

        let mut grants: Vec<UserRoleGrantView> = self
            .grants
            .list_user_role_grants(account.id)
            .await?
            .into_iter()
            .filter(|view| {
                view.grant
                    .is_effective(now, account.is_active, view.role.is_active)
            })
            .collect();

        grants.sort_by(|left, right| right.grant.assigned_at.cmp(&left.grant.assigned_at));
        Ok(grants)
    }
}
