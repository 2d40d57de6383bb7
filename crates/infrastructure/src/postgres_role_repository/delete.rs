use super::*;

use uuid::Uuid;

impl PostgresRoleRepository {
    /// Moves effective holders onto the fallback role and deletes the role in
    /// one transaction. Grants of the deleted role cascade.
    pub(super) async fn delete_role_impl(
        &self,
        role_id: RoleId,
        reassignment: Option<RoleReassignment>,
    ) -> AppResult<Vec<UserId>> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let role_name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        // Row locks keep concurrent assignments of this role out until commit.
        let holders = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT grants.user_id
            FROM user_roles AS grants
            INNER JOIN users ON users.id = grants.user_id
            WHERE grants.role_id = $1
                AND grants.is_active
                AND users.is_active
                AND (grants.expires_at IS NULL OR grants.expires_at > now())
            ORDER BY grants.user_id
            FOR UPDATE OF grants
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role holders: {error}")))?;

        if !holders.is_empty() {
            let Some(reassignment) = reassignment else {
                return Err(missing_fallback(&role_name, holders.len()));
            };

            let fallback_active = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT is_active
                FROM roles
                WHERE id = $1 AND id <> $2
                FOR SHARE
                "#,
            )
            .bind(reassignment.fallback_role_id.as_uuid())
            .bind(role_id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to lock fallback role: {error}")))?
            .unwrap_or(false);

            if !fallback_active {
                return Err(missing_fallback(&role_name, holders.len()));
            }

            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id, assigned_by, expires_at, is_active)
                SELECT holder.user_id, $2, $3, NULL, true
                FROM UNNEST($1::uuid[]) AS holder(user_id)
                ON CONFLICT (user_id, role_id) DO UPDATE
                SET is_active = true,
                    assigned_by = EXCLUDED.assigned_by,
                    assigned_at = now(),
                    expires_at = NULL
                "#,
            )
            .bind(holders.clone())
            .bind(reassignment.fallback_role_id.as_uuid())
            .bind(reassignment.assigned_by.map(|user_id| user_id.as_uuid()))
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to reassign role holders: {error}"))
            })?;
        }

        sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(holders.into_iter().map(UserId::from_uuid).collect())
    }
}

fn missing_fallback(role_name: &str, holder_count: usize) -> AppError {
    AppError::Configuration(format!(
        "role '{role_name}' has {holder_count} active holder(s) but the fallback role is missing or inactive; create or activate it before deleting roles"
    ))
}
