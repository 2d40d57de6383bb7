use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::{CreatedUser, EffectiveRoleGrant, MutationOutcome, UpdateUserInput};
use warden_domain::{UserAccount, UserRoleGrant};

use super::optional_timestamp;
use super::{MirrorStatusResponse, RoleResponse};

/// API representation of a user account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub employee_id: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: String,
}

impl From<UserAccount> for UserResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.id.to_string(),
            display_name: value.display_name(),
            username: value.username.as_str().to_owned(),
            email: value.email.map(|email| email.as_str().to_owned()),
            first_name: value.first_name,
            last_name: value.last_name,
            employee_id: value
                .employee_id
                .map(|employee_id| employee_id.as_str().to_owned()),
            position: value.position,
            department: value.department,
            phone: value.phone,
            is_superuser: value.is_superuser,
            is_staff: value.is_staff,
            is_active: value.is_active,
            date_joined: value.date_joined.to_rfc3339(),
        }
    }
}

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    /// Initial role; the configured default role is used when absent.
    #[serde(default)]
    pub role_id: Option<String>,
}

/// Incoming payload for a partial user update; omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    /// An empty string clears the stored email.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl From<UpdateUserRequest> for UpdateUserInput {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            username: value.username,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            employee_id: value.employee_id,
            position: value.position,
            department: value.department,
            phone: value.phone,
            is_active: value.is_active,
            is_staff: value.is_staff,
            is_superuser: value.is_superuser,
        }
    }
}

/// Updated account with the mirror outcome.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-response.ts"
)]
pub struct UpdateUserResponse {
    pub user: UserResponse,
    pub mirror: MirrorStatusResponse,
}

impl From<MutationOutcome<UserAccount>> for UpdateUserResponse {
    fn from(value: MutationOutcome<UserAccount>) -> Self {
        Self {
            user: value.value.into(),
            mirror: value.mirror.into(),
        }
    }
}

/// Created account with its initial role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-response.ts"
)]
pub struct CreateUserResponse {
    pub user: UserResponse,
    pub role: Option<RoleResponse>,
    pub mirror: MirrorStatusResponse,
}

impl CreateUserResponse {
    pub fn new(outcome: MutationOutcome<CreatedUser>, is_protected: impl Fn(&str) -> bool) -> Self {
        Self {
            user: UserResponse::from(outcome.value.account),
            role: outcome.value.role.map(|role| {
                let protected = is_protected(role.name.as_str());
                RoleResponse::new(role, protected)
            }),
            mirror: outcome.mirror.into(),
        }
    }
}

/// Effective role of a user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-role-response.ts"
)]
pub struct UserRoleResponse {
    pub role_id: String,
    pub role_name: String,
    pub description: Option<String>,
    pub color: String,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
    pub expires_at: Option<String>,
}

impl From<EffectiveRoleGrant> for UserRoleResponse {
    fn from(value: EffectiveRoleGrant) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            role_name: value.role_name,
            description: value.description,
            color: value.color,
            assigned_by: value.assigned_by.map(|user_id| user_id.to_string()),
            assigned_at: value.assigned_at.to_rfc3339(),
            expires_at: optional_timestamp(value.expires_at),
        }
    }
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_id: String,
    /// RFC 3339 timestamp; must lie in the future.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Stored user-role grant row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-role-grant-response.ts"
)]
pub struct UserRoleGrantResponse {
    pub grant_id: String,
    pub user_id: String,
    pub role_id: String,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
    pub expires_at: Option<String>,
    pub is_active: bool,
}

impl From<UserRoleGrant> for UserRoleGrantResponse {
    fn from(value: UserRoleGrant) -> Self {
        Self {
            grant_id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            role_id: value.role_id.to_string(),
            assigned_by: value.assigned_by.map(|user_id| user_id.to_string()),
            assigned_at: value.assigned_at.to_rfc3339(),
            expires_at: optional_timestamp(value.expires_at),
            is_active: value.is_active,
        }
    }
}

/// Role assignment result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-response.ts"
)]
pub struct AssignRoleResponse {
    pub grant: UserRoleGrantResponse,
    pub mirror: MirrorStatusResponse,
}

impl From<MutationOutcome<UserRoleGrant>> for AssignRoleResponse {
    fn from(value: MutationOutcome<UserRoleGrant>) -> Self {
        Self {
            grant: value.value.into(),
            mirror: value.mirror.into(),
        }
    }
}
