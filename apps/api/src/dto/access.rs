use serde::Serialize;
use ts_rs::TS;

/// Access decision for one permission of the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-decision-response.ts"
)]
pub struct PermissionDecisionResponse {
    pub permission: String,
    pub granted: bool,
}

/// Qualified names of every permission the caller effectively holds.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub permissions: Vec<String>,
}
