//! Projects and agent assignments, the resources behind ownership checks.

use std::sync::Arc;

use tracing::info;
use warden_core::{AppError, AppResult, UserId, UserIdentity};
use warden_domain::{
    AdminPermission, AuditAction, Project, ProjectAssignment, ProjectId, validate_project_name,
};

use crate::{
    AccessGate, AuditEvent, AuditRepository, OwnedResource, ProjectRepository, SaveProjectInput,
    UserDirectoryRepository, record_committed,
};

/// Application service for projects.
#[derive(Clone)]
pub struct ProjectService {
    gate: AccessGate,
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserDirectoryRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ProjectService {
    /// Creates a project service.
    #[must_use]
    pub fn new(
        gate: AccessGate,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserDirectoryRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            gate,
            projects,
            users,
            audit_repository,
        }
    }

    /// Lists projects visible to the caller.
    ///
    /// Privileged callers and holders of `project_management` see every
    /// project; agents see the projects they are actively assigned to.
    pub async fn list_projects(&self, actor: &UserIdentity) -> AppResult<Vec<Project>> {
        let account = self.gate.require_active_account(actor).await?;

        if self.manages_projects(actor).await? {
            return self.projects.list_projects().await;
        }

        self.projects.list_projects_for_user(account.id).await
    }

    /// Loads a project the caller owns or manages.
    pub async fn get_project(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Project> {
        if !self.manages_projects(actor).await? {
            self.gate
                .require_object_ownership(actor, OwnedResource::Project(project_id))
                .await?;
        }

        self.find_project(project_id).await
    }

    /// Creates a project.
    pub async fn create_project(
        &self,
        actor: &UserIdentity,
        input: SaveProjectInput,
    ) -> AppResult<Project> {
        self.require_project_management(actor).await?;

        let project = self
            .projects
            .create_project(Self::validated(input)?)
            .await?;

        info!(project_id = %project.id, name = project.name.as_str(), "project created");
        self.audit(
            actor,
            AuditAction::ProjectCreated,
            project.id,
            format!("created project '{}'", project.name),
        )
        .await;

        Ok(project)
    }

    /// Replaces project attributes.
    pub async fn update_project(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        input: SaveProjectInput,
    ) -> AppResult<Project> {
        self.require_project_management(actor).await?;
        self.find_project(project_id).await?;

        let project = self
            .projects
            .update_project(project_id, Self::validated(input)?)
            .await?;

        self.audit(
            actor,
            AuditAction::ProjectUpdated,
            project.id,
            format!("updated project '{}'", project.name),
        )
        .await;

        Ok(project)
    }

    /// Deletes a project and its assignments.
    pub async fn delete_project(&self, actor: &UserIdentity, project_id: ProjectId) -> AppResult<()> {
        self.require_project_management(actor).await?;

        if !self.projects.delete_project(project_id).await? {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        info!(%project_id, "project deleted");
        self.audit(
            actor,
            AuditAction::ProjectDeleted,
            project_id,
            "deleted project".to_owned(),
        )
        .await;

        Ok(())
    }

    /// Assigns an active user to a project, reactivating an earlier assignment.
    pub async fn assign_member(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<ProjectAssignment> {
        self.require_project_management(actor).await?;
        self.find_project(project_id).await?;

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        if !user.is_active {
            return Err(AppError::Validation(format!(
                "user '{}' is inactive and cannot be assigned",
                user.username.as_str()
            )));
        }

        let assignment = self.projects.upsert_assignment(project_id, user_id).await?;

        self.audit(
            actor,
            AuditAction::ProjectMemberAssigned,
            project_id,
            format!("assigned user '{}'", user.username.as_str()),
        )
        .await;

        Ok(assignment)
    }

    /// Removes a user from a project.
    pub async fn remove_member(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.require_project_management(actor).await?;

        if !self
            .projects
            .deactivate_assignment(project_id, user_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not assigned to project '{project_id}'"
            )));
        }

        self.audit(
            actor,
            AuditAction::ProjectMemberRemoved,
            project_id,
            format!("removed user '{user_id}'"),
        )
        .await;

        Ok(())
    }

    fn validated(input: SaveProjectInput) -> AppResult<SaveProjectInput> {
        Ok(SaveProjectInput {
            name: validate_project_name(&input.name)?,
            description: input
                .description
                .map(|description| description.trim().to_owned())
                .filter(|description| !description.is_empty()),
            is_active: input.is_active,
        })
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    async fn require_project_management(&self, actor: &UserIdentity) -> AppResult<()> {
        self.gate
            .require_admin(actor, AdminPermission::ProjectManagement)
            .await
    }

    async fn manages_projects(&self, actor: &UserIdentity) -> AppResult<bool> {
        if self.gate.is_privileged(actor).await? {
            return Ok(true);
        }

        self.gate
            .resolver()
            .resolve_permission(actor.user_id(), AdminPermission::ProjectManagement.as_str())
            .await
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        project_id: ProjectId,
        detail: String,
    ) {
        record_committed(
            self.audit_repository.as_ref(),
            AuditEvent {
                actor: Some(actor.user_id()),
                action,
                resource_type: "project".to_owned(),
                resource_id: project_id.to_string(),
                detail: Some(detail),
            },
        )
        .await;
    }
}
