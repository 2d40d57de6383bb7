//! Keeps the legacy group/capability system in step with roles and permissions.
//!
//! Every role owns one group named `role_<role name>`. The group's capability
//! links mirror the role's effective permission grants and its members mirror
//! the role's effective holders. Reconciliation is diff-based, so re-running
//! a sync without intervening changes writes nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    LegacyCapability, LegacyCapabilityId, LegacyGroup, PermissionId, Role, RoleId,
};

use crate::{GrantRepository, LegacyAuthRepository, PermissionRepository, RoleRepository};

/// Best-effort mirror outcome attached to grant mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    /// Mirror records were written.
    Synced,
    /// The role has no mirror group yet; nothing was written.
    NotLinked,
    /// The mirror write failed; the primary mutation still succeeded.
    Failed(String),
}

impl MirrorStatus {
    /// Keeps the first failure when combining statuses of one mutation.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (failed @ Self::Failed(_), _) | (_, failed @ Self::Failed(_)) => failed,
            (Self::Synced, _) | (_, Self::Synced) => Self::Synced,
            _ => Self::NotLinked,
        }
    }
}

/// Changes applied by one role sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSyncReport {
    /// Synced role.
    pub role_id: RoleId,
    /// Group owned by the role after the sync.
    pub group: LegacyGroup,
    /// Whether the group was created by this sync.
    pub group_created: bool,
    /// Whether a drifted group name was corrected.
    pub group_renamed: bool,
    /// Capability codenames linked by this sync.
    pub capabilities_added: Vec<String>,
    /// Capability codenames unlinked by this sync.
    pub capabilities_removed: Vec<String>,
    /// Users added to the group.
    pub members_added: Vec<UserId>,
    /// Users removed from the group.
    pub members_removed: Vec<UserId>,
}

impl RoleSyncReport {
    /// Returns whether the sync changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.group_created
            && !self.group_renamed
            && self.capabilities_added.is_empty()
            && self.capabilities_removed.is_empty()
            && self.members_added.is_empty()
            && self.members_removed.is_empty()
    }
}

/// Outcome of a full re-sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Permissions whose capability was ensured.
    pub permissions_synced: usize,
    /// Roles whose group was reconciled.
    pub roles_synced: usize,
    /// Per-item failure messages.
    pub failures: Vec<String>,
}

fn sync_failure(error: AppError) -> AppError {
    match error {
        AppError::SyncFailure(_) => error,
        other => AppError::SyncFailure(other.to_string()),
    }
}

/// Application service for mirror reconciliation.
#[derive(Clone)]
pub struct MirrorSyncService {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    grants: Arc<dyn GrantRepository>,
    legacy: Arc<dyn LegacyAuthRepository>,
}

impl MirrorSyncService {
    /// Creates a mirror sync service.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        grants: Arc<dyn GrantRepository>,
        legacy: Arc<dyn LegacyAuthRepository>,
    ) -> Self {
        Self {
            roles,
            permissions,
            grants,
            legacy,
        }
    }

    /// Reconciles the role's group, capability links and members.
    pub async fn sync_role(&self, role_id: RoleId) -> AppResult<RoleSyncReport> {
        let role = self
            .roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        let report = self.reconcile_role(&role).await.map_err(sync_failure)?;

        if !report.is_noop() {
            info!(
                role = role.name.as_str(),
                group = report.group.name.as_str(),
                capabilities_added = report.capabilities_added.len(),
                capabilities_removed = report.capabilities_removed.len(),
                members_added = report.members_added.len(),
                members_removed = report.members_removed.len(),
                "role mirror synced"
            );
        }

        Ok(report)
    }

    /// Ensures the capability for a standalone permission.
    pub async fn sync_permission(&self, permission_id: PermissionId) -> AppResult<LegacyCapability> {
        let permission = self
            .permissions
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' does not exist"))
            })?;

        self.legacy
            .ensure_capability(permission.name.as_str(), permission.capability_label())
            .await
            .map_err(sync_failure)
    }

    /// Syncs every active permission and then every active role.
    ///
    /// Failures are logged and counted; they never abort the run.
    pub async fn sync_all(&self) -> AppResult<SyncSummary> {
        let mut summary = SyncSummary::default();

        for permission in self.permissions.list_permissions().await? {
            if !permission.is_active {
                continue;
            }

            match self.sync_permission(permission.id).await {
                Ok(_) => summary.permissions_synced += 1,
                Err(error) => {
                    warn!(permission = permission.name.as_str(), %error, "permission sync failed");
                    summary
                        .failures
                        .push(format!("permission '{}': {error}", permission.name.as_str()));
                }
            }
        }

        for role in self.roles.list_roles().await? {
            if !role.is_active {
                continue;
            }

            match self.sync_role(role.id).await {
                Ok(_) => summary.roles_synced += 1,
                Err(error) => {
                    warn!(role = role.name.as_str(), %error, "role sync failed");
                    summary
                        .failures
                        .push(format!("role '{}': {error}", role.name.as_str()));
                }
            }
        }

        info!(
            permissions = summary.permissions_synced,
            roles = summary.roles_synced,
            failures = summary.failures.len(),
            "mirror re-sync finished"
        );

        Ok(summary)
    }

    /// Runs [`Self::sync_role`] and reports the outcome instead of failing.
    pub async fn sync_role_status(&self, role_id: RoleId) -> MirrorStatus {
        match self.sync_role(role_id).await {
            Ok(_) => MirrorStatus::Synced,
            Err(error) => {
                warn!(%role_id, %error, "role mirror sync failed");
                MirrorStatus::Failed(error.to_string())
            }
        }
    }

    /// Adds a user to the role's group when the role is linked.
    pub async fn add_member(&self, role: &Role, user_id: UserId) -> MirrorStatus {
        let Some(group_id) = role.legacy_group_id else {
            return MirrorStatus::NotLinked;
        };

        match self.legacy.add_group_member(group_id, user_id).await {
            Ok(()) => MirrorStatus::Synced,
            Err(error) => {
                warn!(role = role.name.as_str(), %user_id, %error, "mirror membership add failed");
                MirrorStatus::Failed(error.to_string())
            }
        }
    }

    /// Removes a user from the role's group when the role is linked.
    pub async fn remove_member(&self, role: &Role, user_id: UserId) -> MirrorStatus {
        let Some(group_id) = role.legacy_group_id else {
            return MirrorStatus::NotLinked;
        };

        match self.legacy.remove_group_member(group_id, user_id).await {
            Ok(()) => MirrorStatus::Synced,
            Err(error) => {
                warn!(role = role.name.as_str(), %user_id, %error, "mirror membership removal failed");
                MirrorStatus::Failed(error.to_string())
            }
        }
    }

    /// Deletes the group of a role that no longer exists.
    pub async fn drop_role_group(&self, role: &Role) -> MirrorStatus {
        let Some(group_id) = role.legacy_group_id else {
            return MirrorStatus::NotLinked;
        };

        match self.legacy.delete_group(group_id).await {
            Ok(()) => MirrorStatus::Synced,
            Err(error) => {
                warn!(role = role.name.as_str(), %error, "mirror group removal failed");
                MirrorStatus::Failed(error.to_string())
            }
        }
    }

    async fn reconcile_role(&self, role: &Role) -> AppResult<RoleSyncReport> {
        let (group, group_created, group_renamed) = self.ensure_role_group(role).await?;

        let mut desired: BTreeMap<LegacyCapabilityId, String> = BTreeMap::new();
        for view in self.grants.list_role_permission_grants(role.id).await? {
            if !view.grant.is_effective(view.permission.is_active) {
                continue;
            }

            let capability = self
                .legacy
                .ensure_capability(view.permission.name.as_str(), view.permission.capability_label())
                .await?;
            desired.insert(capability.id, capability.codename);
        }

        let current: BTreeMap<LegacyCapabilityId, String> = self
            .legacy
            .list_group_capabilities(group.id)
            .await?
            .into_iter()
            .map(|capability| (capability.id, capability.codename))
            .collect();

        let to_add: Vec<LegacyCapabilityId> = desired
            .keys()
            .filter(|id| !current.contains_key(id))
            .copied()
            .collect();
        let to_remove: Vec<LegacyCapabilityId> = current
            .keys()
            .filter(|id| !desired.contains_key(id))
            .copied()
            .collect();

        if !to_add.is_empty() {
            self.legacy.add_group_capabilities(group.id, &to_add).await?;
        }
        if !to_remove.is_empty() {
            self.legacy
                .remove_group_capabilities(group.id, &to_remove)
                .await?;
        }

        let now = Utc::now();
        let desired_members: BTreeSet<UserId> = self
            .grants
            .list_role_holders(role.id)
            .await?
            .into_iter()
            .filter(|view| view.grant.is_effective(now, view.user.is_active, role.is_active))
            .map(|view| view.user.id)
            .collect();
        let current_members: BTreeSet<UserId> = self
            .legacy
            .list_group_members(group.id)
            .await?
            .into_iter()
            .collect();

        let members_added: Vec<UserId> = desired_members
            .difference(&current_members)
            .copied()
            .collect();
        let members_removed: Vec<UserId> = current_members
            .difference(&desired_members)
            .copied()
            .collect();

        for user_id in &members_added {
            self.legacy.add_group_member(group.id, *user_id).await?;
        }
        for user_id in &members_removed {
            self.legacy.remove_group_member(group.id, *user_id).await?;
        }

        let mut capabilities_added: Vec<String> =
            to_add.iter().filter_map(|id| desired.get(id).cloned()).collect();
        let mut capabilities_removed: Vec<String> =
            to_remove.iter().filter_map(|id| current.get(id).cloned()).collect();
        capabilities_added.sort_unstable();
        capabilities_removed.sort_unstable();

        Ok(RoleSyncReport {
            role_id: role.id,
            group,
            group_created,
            group_renamed,
            capabilities_added,
            capabilities_removed,
            members_added,
            members_removed,
        })
    }

    async fn ensure_role_group(&self, role: &Role) -> AppResult<(LegacyGroup, bool, bool)> {
        let expected_name = role.legacy_group_name();

        if let Some(group_id) = role.legacy_group_id
            && let Some(group) = self.legacy.find_group(group_id).await?
        {
            if group.name == expected_name {
                return Ok((group, false, false));
            }

            self.legacy.rename_group(group.id, &expected_name).await?;
            return Ok((
                LegacyGroup {
                    id: group.id,
                    name: expected_name,
                },
                false,
                true,
            ));
        }

        let (group, created) = match self.legacy.find_group_by_name(&expected_name).await? {
            Some(group) => (group, false),
            None => (self.legacy.ensure_group(&expected_name).await?, true),
        };

        self.roles.link_legacy_group(role.id, group.id).await?;
        Ok((group, created, false))
    }
}
