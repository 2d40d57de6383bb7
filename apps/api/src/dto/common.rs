use serde::Serialize;
use ts_rs::TS;
use warden_application::{MirrorStatus, SyncSummary};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Outcome of the legacy mirror update attached to a mutation.
///
/// `status` is one of `synced`, `not_linked` or `failed`. A failed mirror
/// never fails the request itself.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/mirror-status-response.ts"
)]
pub struct MirrorStatusResponse {
    pub status: &'static str,
    pub error: Option<String>,
}

impl From<MirrorStatus> for MirrorStatusResponse {
    fn from(value: MirrorStatus) -> Self {
        match value {
            MirrorStatus::Synced => Self {
                status: "synced",
                error: None,
            },
            MirrorStatus::NotLinked => Self {
                status: "not_linked",
                error: None,
            },
            MirrorStatus::Failed(error) => Self {
                status: "failed",
                error: Some(error),
            },
        }
    }
}

/// Result of a full mirror reconciliation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sync-summary-response.ts"
)]
pub struct SyncSummaryResponse {
    pub permissions_synced: u32,
    pub roles_synced: u32,
    pub failures: Vec<String>,
}

impl From<SyncSummary> for SyncSummaryResponse {
    fn from(value: SyncSummary) -> Self {
        Self {
            permissions_synced: u32::try_from(value.permissions_synced).unwrap_or(u32::MAX),
            roles_synced: u32::try_from(value.roles_synced).unwrap_or(u32::MAX),
            failures: value.failures,
        }
    }
}
