//! PostgreSQL-backed user directory.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::{
    AccountChanges, NewUserAccount, UserCredentials, UserDirectoryRepository,
};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::UserAccount;

use crate::postgres_rows::{UserRow, is_unique_violation};

/// PostgreSQL implementation of the user directory port.
#[derive(Clone)]
pub struct PostgresUserDirectoryRepository {
    pool: PgPool,
}

impl PostgresUserDirectoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

fn user_conflict_or_internal(error: sqlx::Error, username: &str, operation: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!(
            "username '{username}' or employee id already exists"
        ));
    }

    AppError::Internal(format!("failed to {operation} user: {error}"))
}

#[async_trait]
impl UserDirectoryRepository for PostgresUserDirectoryRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, username, email, first_name, last_name, employee_id,
                position, department, phone, is_superuser, is_staff, is_active, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?
        .map(UserRow::into_account)
        .transpose()
    }

    async fn find_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT
                id, username, email, first_name, last_name, employee_id,
                position, department, phone, is_superuser, is_staff, is_active, date_joined,
                password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load credentials: {error}")))?;

        row.map(|row| {
            Ok(UserCredentials {
                account: row.user.into_account()?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn create_user(&self, input: NewUserAccount) -> AppResult<UserAccount> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                username, email, first_name, last_name, employee_id,
                position, department, phone, is_staff, is_superuser, password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING
                id, username, email, first_name, last_name, employee_id,
                position, department, phone, is_superuser, is_staff, is_active, date_joined
            "#,
        )
        .bind(input.username.as_str())
        .bind(input.email.as_ref().map(|email| email.as_str()))
        .bind(input.first_name.as_str())
        .bind(input.last_name.as_str())
        .bind(input.employee_id.as_ref().map(|employee_id| employee_id.as_str()))
        .bind(input.position.as_deref())
        .bind(input.department.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.is_staff)
        .bind(input.is_superuser)
        .bind(input.password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| user_conflict_or_internal(error, input.username.as_str(), "create"))?;

        row.into_account()
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, username, email, first_name, last_name, employee_id,
                position, department, phone, is_superuser, is_staff, is_active, date_joined
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?
        .into_iter()
        .map(UserRow::into_account)
        .collect()
    }

    async fn update_user(
        &self,
        user_id: UserId,
        changes: AccountChanges,
    ) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                username = $2,
                email = $3,
                first_name = $4,
                last_name = $5,
                employee_id = $6,
                position = $7,
                department = $8,
                phone = $9,
                is_active = $10,
                is_staff = $11,
                is_superuser = $12
            WHERE id = $1
            RETURNING
                id, username, email, first_name, last_name, employee_id,
                position, department, phone, is_superuser, is_staff, is_active, date_joined
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(changes.username.as_str())
        .bind(changes.email.as_ref().map(|email| email.as_str()))
        .bind(changes.first_name.as_str())
        .bind(changes.last_name.as_str())
        .bind(changes.employee_id.as_ref().map(|employee_id| employee_id.as_str()))
        .bind(changes.position.as_deref())
        .bind(changes.department.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.is_active)
        .bind(changes.is_staff)
        .bind(changes.is_superuser)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| user_conflict_or_internal(error, changes.username.as_str(), "update"))?
        .map(UserRow::into_account)
        .transpose()
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete user: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests;
