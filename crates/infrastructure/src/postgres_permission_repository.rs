//! PostgreSQL-backed permission catalog.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_application::{CreatePermissionInput, PermissionRepository};
use warden_core::{AppError, AppResult};
use warden_domain::{Permission, PermissionId};

use crate::postgres_rows::{PermissionRow, is_unique_violation};

/// PostgreSQL implementation of the permission repository port.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, category, is_active, created_at, updated_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, category, is_active, created_at, updated_at
            FROM permissions
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find permission by name: {error}"))
        })?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, category, is_active, created_at, updated_at
            FROM permissions
            ORDER BY category NULLS FIRST, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?
        .into_iter()
        .map(PermissionRow::into_permission)
        .collect()
    }

    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (name, description, category, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, category, is_active, created_at, updated_at
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(input.category.as_ref().map(|category| category.as_str()))
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "permission '{}' already exists",
                    input.name.as_str()
                ));
            }

            AppError::Internal(format!("failed to create permission: {error}"))
        })?
        .into_permission()
    }

    async fn list_categories(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category
            FROM permissions
            WHERE is_active AND category IS NOT NULL
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permission categories: {error}"))
        })
    }
}
