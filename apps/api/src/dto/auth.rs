use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::CallerProfile;

use super::{UserResponse, UserRoleResponse};

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub username: String,
    pub password: String,
}

/// Authenticated caller with effective roles and permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/caller-profile-response.ts"
)]
pub struct CallerProfileResponse {
    pub user: UserResponse,
    pub roles: Vec<UserRoleResponse>,
    pub permissions: Vec<String>,
}

impl From<CallerProfile> for CallerProfileResponse {
    fn from(value: CallerProfile) -> Self {
        Self {
            user: value.account.into(),
            roles: value.roles.into_iter().map(UserRoleResponse::from).collect(),
            permissions: value.permissions.into_iter().collect(),
        }
    }
}
