use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::SaveProjectInput;
use warden_domain::{Project, ProjectAssignment};

/// API representation of a project.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Active assignments of active users.
    pub member_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        Self {
            project_id: value.id.to_string(),
            name: value.name,
            description: value.description,
            is_active: value.is_active,
            member_count: value.member_count,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for project create and full update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-project-request.ts"
)]
pub struct SaveProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<SaveProjectRequest> for SaveProjectInput {
    fn from(value: SaveProjectRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            is_active: value.is_active,
        }
    }
}

/// Incoming payload for assigning a user to a project.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-project-member-request.ts"
)]
pub struct AssignProjectMemberRequest {
    pub user_id: String,
}

/// Project membership row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-assignment-response.ts"
)]
pub struct ProjectAssignmentResponse {
    pub project_id: String,
    pub user_id: String,
    pub assigned_at: String,
    pub is_active: bool,
}

impl From<ProjectAssignment> for ProjectAssignmentResponse {
    fn from(value: ProjectAssignment) -> Self {
        Self {
            project_id: value.project_id.to_string(),
            user_id: value.user_id.to_string(),
            assigned_at: value.assigned_at.to_rfc3339(),
            is_active: value.is_active,
        }
    }
}
