//! PostgreSQL-backed user-role and role-permission grants.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::{
    GrantRepository, RoleHolderView, RolePermissionGrantView, UpsertUserRoleGrant,
    UserRoleGrantView,
};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{PermissionId, RoleId, RolePermissionGrant, UserRoleGrant};

use crate::postgres_rows::{
    PermissionRow, RolePermissionGrantRow, RoleRow, UserRoleGrantRow, UserRow,
};

/// PostgreSQL implementation of the grant repository port.
#[derive(Clone)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleGrantViewRow {
    #[sqlx(flatten)]
    grant: UserRoleGrantRow,
    #[sqlx(flatten)]
    role: RoleRow,
}

#[derive(Debug, FromRow)]
struct RoleHolderRow {
    #[sqlx(flatten)]
    grant: UserRoleGrantRow,
    #[sqlx(flatten)]
    user: UserRow,
}

#[derive(Debug, FromRow)]
struct RolePermissionGrantViewRow {
    #[sqlx(flatten)]
    grant: RolePermissionGrantRow,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn list_user_role_grants(&self, user_id: UserId) -> AppResult<Vec<UserRoleGrantView>> {
        let rows = sqlx::query_as::<_, UserRoleGrantViewRow>(
            r#"
            SELECT
                grants.id AS grant_id,
                grants.user_id AS grant_user_id,
                grants.role_id AS grant_role_id,
                grants.assigned_by AS grant_assigned_by,
                grants.assigned_at AS grant_assigned_at,
                grants.expires_at AS grant_expires_at,
                grants.is_active AS grant_is_active,
                roles.id,
                roles.name,
                roles.description,
                roles.color,
                roles.is_active,
                roles.legacy_group_id,
                roles.created_at,
                roles.updated_at
            FROM user_roles AS grants
            INNER JOIN roles
                ON roles.id = grants.role_id
            WHERE grants.user_id = $1
            ORDER BY grants.assigned_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user roles: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(UserRoleGrantView {
                    grant: row.grant.into(),
                    role: row.role.into_role()?,
                })
            })
            .collect()
    }

    async fn list_role_holders(&self, role_id: RoleId) -> AppResult<Vec<RoleHolderView>> {
        let rows = sqlx::query_as::<_, RoleHolderRow>(
            r#"
            SELECT
                grants.id AS grant_id,
                grants.user_id AS grant_user_id,
                grants.role_id AS grant_role_id,
                grants.assigned_by AS grant_assigned_by,
                grants.assigned_at AS grant_assigned_at,
                grants.expires_at AS grant_expires_at,
                grants.is_active AS grant_is_active,
                users.id,
                users.username,
                users.email,
                users.first_name,
                users.last_name,
                users.employee_id,
                users.position,
                users.department,
                users.phone,
                users.is_superuser,
                users.is_staff,
                users.is_active,
                users.date_joined
            FROM user_roles AS grants
            INNER JOIN users
                ON users.id = grants.user_id
            WHERE grants.role_id = $1
            ORDER BY grants.assigned_at DESC
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role holders: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleHolderView {
                    grant: row.grant.into(),
                    user: row.user.into_account()?,
                })
            })
            .collect()
    }

    async fn upsert_user_role_grant(&self, input: UpsertUserRoleGrant) -> AppResult<UserRoleGrant> {
        let row = sqlx::query_as::<_, UserRoleGrantRow>(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_by, expires_at, is_active)
            VALUES ($1, $2, $3, $4, true)
            ON CONFLICT (user_id, role_id) DO UPDATE
            SET is_active = true,
                assigned_by = EXCLUDED.assigned_by,
                assigned_at = now(),
                expires_at = EXCLUDED.expires_at
            RETURNING
                id AS grant_id,
                user_id AS grant_user_id,
                role_id AS grant_role_id,
                assigned_by AS grant_assigned_by,
                assigned_at AS grant_assigned_at,
                expires_at AS grant_expires_at,
                is_active AS grant_is_active
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(input.role_id.as_uuid())
        .bind(input.assigned_by.map(|user_id| user_id.as_uuid()))
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        Ok(row.into())
    }

    async fn deactivate_user_role_grant(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE user_roles
            SET is_active = false
            WHERE user_id = $1 AND role_id = $2 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke role: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_role_permission_grants(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionGrantView>> {
        let rows = sqlx::query_as::<_, RolePermissionGrantViewRow>(
            r#"
            SELECT
                grants.id AS grant_id,
                grants.role_id AS grant_role_id,
                grants.permission_id AS grant_permission_id,
                grants.granted_by AS grant_granted_by,
                grants.granted_at AS grant_granted_at,
                grants.is_active AS grant_is_active,
                permissions.id,
                permissions.name,
                permissions.description,
                permissions.category,
                permissions.is_active,
                permissions.created_at,
                permissions.updated_at
            FROM role_permissions AS grants
            INNER JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE grants.role_id = $1
            ORDER BY permissions.category NULLS FIRST, permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role permissions: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(RolePermissionGrantView {
                    grant: row.grant.into(),
                    permission: row.permission.into_permission()?,
                })
            })
            .collect()
    }

    async fn upsert_role_permission_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> AppResult<RolePermissionGrant> {
        let row = sqlx::query_as::<_, RolePermissionGrantRow>(
            r#"
            INSERT INTO role_permissions (role_id, permission_id, granted_by, is_active)
            VALUES ($1, $2, $3, true)
            ON CONFLICT (role_id, permission_id) DO UPDATE
            SET is_active = true,
                granted_by = EXCLUDED.granted_by,
                granted_at = now()
            RETURNING
                id AS grant_id,
                role_id AS grant_role_id,
                permission_id AS grant_permission_id,
                granted_by AS grant_granted_by,
                granted_at AS grant_granted_at,
                is_active AS grant_is_active
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .bind(granted_by.map(|user_id| user_id.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to grant permission: {error}")))?;

        Ok(row.into())
    }

    async fn deactivate_role_permission_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE role_permissions
            SET is_active = false
            WHERE role_id = $1 AND permission_id = $2 AND is_active
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permission: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
