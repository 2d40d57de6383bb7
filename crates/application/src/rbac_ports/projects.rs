use async_trait::async_trait;
use warden_core::{AppResult, UserId};
use warden_domain::{Project, ProjectAssignment, ProjectId};

/// Full project attributes for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveProjectInput {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Activation flag.
    pub is_active: bool,
}

/// Repository port for projects and agent assignments.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Lists all projects ordered by name.
    async fn list_projects(&self) -> AppResult<Vec<Project>>;

    /// Lists projects the user is actively assigned to.
    async fn list_projects_for_user(&self, user_id: UserId) -> AppResult<Vec<Project>>;

    /// Finds a project by identifier.
    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>>;

    /// Creates a project.
    async fn create_project(&self, input: SaveProjectInput) -> AppResult<Project>;

    /// Replaces project attributes.
    async fn update_project(
        &self,
        project_id: ProjectId,
        input: SaveProjectInput,
    ) -> AppResult<Project>;

    /// Deletes a project and its assignments. Returns `false` when absent.
    async fn delete_project(&self, project_id: ProjectId) -> AppResult<bool>;

    /// Finds the assignment row for a (project, user) pair.
    async fn find_assignment(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<ProjectAssignment>>;

    /// Inserts or reactivates an assignment.
    async fn upsert_assignment(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<ProjectAssignment>;

    /// Deactivates an assignment. Returns `false` when no active row existed.
    async fn deactivate_assignment(&self, project_id: ProjectId, user_id: UserId)
    -> AppResult<bool>;
}
