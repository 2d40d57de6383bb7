use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::MutationOutcome;
use warden_domain::{LegacyCapability, Permission, RolePermissionGrant};

use super::MirrorStatusResponse;

/// API representation of a permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub name: String,
    /// `category.name`, or the bare name for uncategorised permissions.
    pub qualified_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.id.to_string(),
            qualified_name: value.qualified_name(),
            name: value.name.as_str().to_owned(),
            description: value.description,
            category: value.category.map(|category| category.as_str().to_owned()),
            is_active: value.is_active,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Permission creation result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-mutation-response.ts"
)]
pub struct PermissionMutationResponse {
    pub permission: PermissionResponse,
    pub mirror: MirrorStatusResponse,
}

impl From<MutationOutcome<Permission>> for PermissionMutationResponse {
    fn from(value: MutationOutcome<Permission>) -> Self {
        Self {
            permission: value.value.into(),
            mirror: value.mirror.into(),
        }
    }
}

/// Incoming payload for granting a permission to a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-permission-request.ts"
)]
pub struct GrantPermissionRequest {
    pub permission_id: String,
}

/// Stored role-permission grant row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-permission-grant-response.ts"
)]
pub struct RolePermissionGrantResponse {
    pub grant_id: String,
    pub role_id: String,
    pub permission_id: String,
    pub granted_by: Option<String>,
    pub granted_at: String,
    pub is_active: bool,
}

impl From<RolePermissionGrant> for RolePermissionGrantResponse {
    fn from(value: RolePermissionGrant) -> Self {
        Self {
            grant_id: value.id.to_string(),
            role_id: value.role_id.to_string(),
            permission_id: value.permission_id.to_string(),
            granted_by: value.granted_by.map(|user_id| user_id.to_string()),
            granted_at: value.granted_at.to_rfc3339(),
            is_active: value.is_active,
        }
    }
}

/// Permission grant result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-permission-response.ts"
)]
pub struct GrantPermissionResponse {
    pub grant: RolePermissionGrantResponse,
    pub mirror: MirrorStatusResponse,
}

impl From<MutationOutcome<RolePermissionGrant>> for GrantPermissionResponse {
    fn from(value: MutationOutcome<RolePermissionGrant>) -> Self {
        Self {
            grant: value.value.into(),
            mirror: value.mirror.into(),
        }
    }
}

/// Legacy capability mirrored from a permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/capability-response.ts"
)]
pub struct CapabilityResponse {
    pub capability_id: i64,
    pub codename: String,
    pub name: String,
}

impl From<LegacyCapability> for CapabilityResponse {
    fn from(value: LegacyCapability) -> Self {
        Self {
            capability_id: value.id.as_i64(),
            codename: value.codename,
            name: value.name,
        }
    }
}
