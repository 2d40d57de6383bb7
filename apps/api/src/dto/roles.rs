use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use warden_application::{MutationOutcome, RoleDeletion, RoleHolder, RoleSyncReport};
use warden_domain::Role;

use super::MirrorStatusResponse;
use super::optional_timestamp;

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
    /// Protected roles cannot be deleted, renamed or deactivated.
    pub is_protected: bool,
    pub legacy_group_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RoleResponse {
    pub fn new(role: Role, is_protected: bool) -> Self {
        Self {
            role_id: role.id.to_string(),
            legacy_group_name: role.legacy_group_name(),
            name: role.name.as_str().to_owned(),
            description: role.description,
            color: role.color.as_str().to_owned(),
            is_active: role.is_active,
            is_protected,
            created_at: role.created_at.to_rfc3339(),
            updated_at: role.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `#RRGGBB`; defaults to `#007bff`.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial role update; omitted fields keep their value.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "present")]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Role create or update result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-mutation-response.ts"
)]
pub struct RoleMutationResponse {
    pub role: RoleResponse,
    pub mirror: MirrorStatusResponse,
}

impl RoleMutationResponse {
    pub fn new(outcome: MutationOutcome<Role>, is_protected: bool) -> Self {
        Self {
            role: RoleResponse::new(outcome.value, is_protected),
            mirror: outcome.mirror.into(),
        }
    }
}

/// Role deletion result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-deletion-response.ts"
)]
pub struct RoleDeletionResponse {
    pub role_id: String,
    pub role_name: String,
    pub fallback_role_id: Option<String>,
    pub reassigned_user_ids: Vec<String>,
    pub mirror: MirrorStatusResponse,
}

impl From<MutationOutcome<RoleDeletion>> for RoleDeletionResponse {
    fn from(value: MutationOutcome<RoleDeletion>) -> Self {
        Self {
            role_id: value.value.role_id.to_string(),
            role_name: value.value.role_name,
            fallback_role_id: value
                .value
                .fallback_role_id
                .map(|role_id| role_id.to_string()),
            reassigned_user_ids: value
                .value
                .reassigned_user_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            mirror: value.mirror.into(),
        }
    }
}

/// Effective holder of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-holder-response.ts"
)]
pub struct RoleHolderResponse {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
    pub expires_at: Option<String>,
}

impl From<RoleHolder> for RoleHolderResponse {
    fn from(value: RoleHolder) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            username: value.username,
            display_name: value.display_name,
            assigned_by: value.assigned_by.map(|user_id| user_id.to_string()),
            assigned_at: value.assigned_at.to_rfc3339(),
            expires_at: optional_timestamp(value.expires_at),
        }
    }
}

/// Changes applied by an on-demand role sync.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-sync-response.ts"
)]
pub struct RoleSyncResponse {
    pub role_id: String,
    pub group_name: String,
    pub group_created: bool,
    pub group_renamed: bool,
    pub capabilities_added: Vec<String>,
    pub capabilities_removed: Vec<String>,
    pub members_added: Vec<String>,
    pub members_removed: Vec<String>,
}

impl From<RoleSyncReport> for RoleSyncResponse {
    fn from(value: RoleSyncReport) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            group_name: value.group.name,
            group_created: value.group_created,
            group_renamed: value.group_renamed,
            capabilities_added: value.capabilities_added,
            capabilities_removed: value.capabilities_removed,
            members_added: value.members_added.iter().map(ToString::to_string).collect(),
            members_removed: value
                .members_removed
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateRoleRequest;

    #[test]
    fn update_request_distinguishes_null_from_missing_description() -> Result<(), serde_json::Error>
    {
        let missing: UpdateRoleRequest = serde_json::from_str(r#"{"name":"Editors"}"#)?;
        assert_eq!(missing.description, None);
        assert_eq!(missing.name.as_deref(), Some("Editors"));

        let cleared: UpdateRoleRequest = serde_json::from_str(r#"{"description":null}"#)?;
        assert_eq!(cleared.description, Some(None));

        let replaced: UpdateRoleRequest =
            serde_json::from_str(r##"{"description":"Writes","color":"#112233"}"##)?;
        assert_eq!(replaced.description, Some(Some("Writes".to_owned())));
        assert_eq!(replaced.color.as_deref(), Some("#112233"));

        Ok(())
    }
}
