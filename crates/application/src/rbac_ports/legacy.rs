use async_trait::async_trait;
use warden_core::{AppResult, UserId};
use warden_domain::{LegacyCapability, LegacyCapabilityId, LegacyGroup, LegacyGroupId};

/// Port for the secondary group/capability authorization system.
#[async_trait]
pub trait LegacyAuthRepository: Send + Sync {
    /// Finds a group by identifier.
    async fn find_group(&self, group_id: LegacyGroupId) -> AppResult<Option<LegacyGroup>>;

    /// Finds a group by unique name.
    async fn find_group_by_name(&self, name: &str) -> AppResult<Option<LegacyGroup>>;

    /// Returns the group with this name, creating it when missing.
    async fn ensure_group(&self, name: &str) -> AppResult<LegacyGroup>;

    /// Renames a group.
    async fn rename_group(&self, group_id: LegacyGroupId, name: &str) -> AppResult<()>;

    /// Deletes a group with its capability and member links.
    async fn delete_group(&self, group_id: LegacyGroupId) -> AppResult<()>;

    /// Returns the capability keyed by `codename`, creating it or refreshing its label.
    async fn ensure_capability(&self, codename: &str, label: &str) -> AppResult<LegacyCapability>;

    /// Lists capabilities linked to a group.
    async fn list_group_capabilities(
        &self,
        group_id: LegacyGroupId,
    ) -> AppResult<Vec<LegacyCapability>>;

    /// Links capabilities to a group; existing links are kept.
    async fn add_group_capabilities(
        &self,
        group_id: LegacyGroupId,
        capability_ids: &[LegacyCapabilityId],
    ) -> AppResult<()>;

    /// Unlinks capabilities from a group.
    async fn remove_group_capabilities(
        &self,
        group_id: LegacyGroupId,
        capability_ids: &[LegacyCapabilityId],
    ) -> AppResult<()>;

    /// Lists members of a group.
    async fn list_group_members(&self, group_id: LegacyGroupId) -> AppResult<Vec<UserId>>;

    /// Adds a user to a group; existing membership is kept.
    async fn add_group_member(&self, group_id: LegacyGroupId, user_id: UserId) -> AppResult<()>;

    /// Removes a user from a group.
    async fn remove_group_member(&self, group_id: LegacyGroupId, user_id: UserId)
    -> AppResult<()>;
}
