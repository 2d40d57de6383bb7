//! PostgreSQL-backed projects and agent assignments.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_application::{ProjectRepository, SaveProjectInput};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{Project, ProjectAssignment, ProjectId};

use crate::postgres_rows::{ProjectAssignmentRow, ProjectRow};

/// PostgreSQL implementation of the project repository port.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                projects.id,
                projects.name,
                projects.description,
                projects.is_active,
                projects.created_at,
                projects.updated_at,
                (
                    SELECT COUNT(*)
                    FROM project_assignments AS members
                    INNER JOIN users ON users.id = members.user_id
                    WHERE members.project_id = projects.id
                        AND members.is_active
                        AND users.is_active
                ) AS member_count
            FROM projects
            ORDER BY projects.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list projects: {error}")))?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn list_projects_for_user(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                projects.id,
                projects.name,
                projects.description,
                projects.is_active,
                projects.created_at,
                projects.updated_at,
                (
                    SELECT COUNT(*)
                    FROM project_assignments AS members
                    INNER JOIN users ON users.id = members.user_id
                    WHERE members.project_id = projects.id
                        AND members.is_active
                        AND users.is_active
                ) AS member_count
            FROM projects
            INNER JOIN project_assignments AS assignments
                ON assignments.project_id = projects.id
            WHERE assignments.user_id = $1
                AND assignments.is_active
            ORDER BY projects.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list projects for user: {error}"))
        })?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                projects.id,
                projects.name,
                projects.description,
                projects.is_active,
                projects.created_at,
                projects.updated_at,
                (
                    SELECT COUNT(*)
                    FROM project_assignments AS members
                    INNER JOIN users ON users.id = members.user_id
                    WHERE members.project_id = projects.id
                        AND members.is_active
                        AND users.is_active
                ) AS member_count
            FROM projects
            WHERE projects.id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))?;

        Ok(row.map(Project::from))
    }

    async fn create_project(&self, input: SaveProjectInput) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (name, description, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, is_active, created_at, updated_at, 0::BIGINT AS member_count
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create project: {error}")))?;

        Ok(row.into())
    }

    async fn update_project(
        &self,
        project_id: ProjectId,
        input: SaveProjectInput,
    ) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            WITH updated AS (
                UPDATE projects
                SET name = $2, description = $3, is_active = $4, updated_at = now()
                WHERE id = $1
                RETURNING id, name, description, is_active, created_at, updated_at
            )
            SELECT
                updated.id,
                updated.name,
                updated.description,
                updated.is_active,
                updated.created_at,
                updated.updated_at,
                (
                    SELECT COUNT(*)
                    FROM project_assignments AS members
                    INNER JOIN users ON users.id = members.user_id
                    WHERE members.project_id = updated.id
                        AND members.is_active
                        AND users.is_active
                ) AS member_count
            FROM updated
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update project: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))?;

        Ok(row.into())
    }

    async fn delete_project(&self, project_id: ProjectId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete project: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn find_assignment(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<ProjectAssignment>> {
        let row = sqlx::query_as::<_, ProjectAssignmentRow>(
            r#"
            SELECT project_id, user_id, assigned_at, is_active
            FROM project_assignments
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find project assignment: {error}"))
        })?;

        Ok(row.map(ProjectAssignment::from))
    }

    async fn upsert_assignment(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<ProjectAssignment> {
        let row = sqlx::query_as::<_, ProjectAssignmentRow>(
            r#"
            INSERT INTO project_assignments (project_id, user_id, is_active)
            VALUES ($1, $2, true)
            ON CONFLICT (project_id, user_id) DO UPDATE
            SET is_active = true, assigned_at = now()
            RETURNING project_id, user_id, assigned_at, is_active
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign project member: {error}")))?;

        Ok(row.into())
    }

    async fn deactivate_assignment(&self, project_id: ProjectId, user_id: UserId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE project_assignments
            SET is_active = false
            WHERE project_id = $1 AND user_id = $2 AND is_active
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove project member: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
