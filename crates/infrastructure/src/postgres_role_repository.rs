//! PostgreSQL-backed role catalog.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_application::{CreateRoleInput, RoleReassignment, RoleRepository, UpdateRoleInput};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{LegacyGroupId, Role, RoleId};

use crate::postgres_rows::{RoleRow, is_unique_violation};

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod delete;

fn map_role_conflict(error: sqlx::Error, role_name: &str, action: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, color, is_active, legacy_group_id, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, color, is_active, legacy_group_id, created_at, updated_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, color, is_active, legacy_group_id, created_at, updated_at
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?
        .into_iter()
        .map(RoleRow::into_role)
        .collect()
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, description, color, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, color, is_active, legacy_group_id, created_at, updated_at
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(input.color.as_str())
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, input.name.as_str(), "create role"))?
        .into_role()
    }

    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let role_name = input
            .name
            .as_ref()
            .map_or_else(String::new, |name| name.as_str().to_owned());

        sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                color = COALESCE($5, color),
                is_active = COALESCE($6, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, color, is_active, legacy_group_id, created_at, updated_at
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(input.name.as_ref().map(|name| name.as_str()))
        .bind(input.description.is_some())
        .bind(input.description.flatten())
        .bind(input.color.as_ref().map(|color| color.as_str()))
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role_name.as_str(), "update role"))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?
        .into_role()
    }

    async fn link_legacy_group(&self, role_id: RoleId, group_id: LegacyGroupId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET legacy_group_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(group_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to link legacy group: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        Ok(())
    }

    async fn delete_role(
        &self,
        role_id: RoleId,
        reassignment: Option<RoleReassignment>,
    ) -> AppResult<Vec<UserId>> {
        self.delete_role_impl(role_id, reassignment).await
    }
}
