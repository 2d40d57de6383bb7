//! PostgreSQL-backed legacy group and capability tables mirrored from RBAC.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::LegacyAuthRepository;
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{LegacyCapability, LegacyCapabilityId, LegacyGroup, LegacyGroupId};

use crate::postgres_rows::is_unique_violation;

/// PostgreSQL implementation of the legacy auth mirror port.
#[derive(Clone)]
pub struct PostgresLegacyAuthRepository {
    pool: PgPool,
}

impl PostgresLegacyAuthRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_capability(&self, codename: &str) -> AppResult<Option<CapabilityRow>> {
        sqlx::query_as::<_, CapabilityRow>(
            r#"
            SELECT id, codename, name
            FROM legacy_capabilities
            WHERE codename = $1
            "#,
        )
        .bind(codename)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find legacy capability: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: i64,
    name: String,
}

impl From<GroupRow> for LegacyGroup {
    fn from(row: GroupRow) -> Self {
        Self {
            id: LegacyGroupId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
struct CapabilityRow {
    id: i64,
    codename: String,
    name: String,
}

impl From<CapabilityRow> for LegacyCapability {
    fn from(row: CapabilityRow) -> Self {
        Self {
            id: LegacyCapabilityId::new(row.id),
            codename: row.codename,
            name: row.name,
        }
    }
}

fn capability_keys(capability_ids: &[LegacyCapabilityId]) -> Vec<i64> {
    capability_ids
        .iter()
        .map(LegacyCapabilityId::as_i64)
        .collect()
}

#[async_trait]
impl LegacyAuthRepository for PostgresLegacyAuthRepository {
    async fn find_group(&self, group_id: LegacyGroupId) -> AppResult<Option<LegacyGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name
            FROM legacy_groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find legacy group: {error}")))?;

        Ok(row.map(LegacyGroup::from))
    }

    async fn find_group_by_name(&self, name: &str) -> AppResult<Option<LegacyGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name
            FROM legacy_groups
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find legacy group: {error}")))?;

        Ok(row.map(LegacyGroup::from))
    }

    async fn ensure_group(&self, name: &str) -> AppResult<LegacyGroup> {
        let inserted = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO legacy_groups (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to ensure legacy group: {error}")))?;

        if let Some(row) = inserted {
            return Ok(row.into());
        }

        self.find_group_by_name(name).await?.ok_or_else(|| {
            AppError::Internal(format!("legacy group '{name}' vanished while being ensured"))
        })
    }

    async fn rename_group(&self, group_id: LegacyGroupId, name: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE legacy_groups
            SET name = $2
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_i64())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!("legacy group '{name}' already exists"));
            }

            AppError::Internal(format!("failed to rename legacy group: {error}"))
        })?;

        Ok(())
    }

    async fn delete_group(&self, group_id: LegacyGroupId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM legacy_groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete legacy group: {error}")))?;

        Ok(())
    }

    async fn ensure_capability(&self, codename: &str, label: &str) -> AppResult<LegacyCapability> {
        let existing = match self.find_capability(codename).await? {
            Some(row) => row,
            None => {
                let inserted = sqlx::query_as::<_, CapabilityRow>(
                    r#"
                    INSERT INTO legacy_capabilities (codename, name)
                    VALUES ($1, $2)
                    ON CONFLICT (codename) DO NOTHING
                    RETURNING id, codename, name
                    "#,
                )
                .bind(codename)
                .bind(label)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to ensure legacy capability: {error}"))
                })?;

                match inserted {
                    Some(row) => return Ok(row.into()),
                    None => self.find_capability(codename).await?.ok_or_else(|| {
                        AppError::Internal(format!(
                            "legacy capability '{codename}' vanished while being ensured"
                        ))
                    })?,
                }
            }
        };

        if existing.name == label {
            return Ok(existing.into());
        }

        let row = sqlx::query_as::<_, CapabilityRow>(
            r#"
            UPDATE legacy_capabilities
            SET name = $2
            WHERE id = $1 AND name IS DISTINCT FROM $2
            RETURNING id, codename, name
            "#,
        )
        .bind(existing.id)
        .bind(label)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to relabel legacy capability: {error}"))
        })?;

        Ok(row.unwrap_or(existing).into())
    }

    async fn list_group_capabilities(
        &self,
        group_id: LegacyGroupId,
    ) -> AppResult<Vec<LegacyCapability>> {
        let rows = sqlx::query_as::<_, CapabilityRow>(
            r#"
            SELECT capabilities.id, capabilities.codename, capabilities.name
            FROM legacy_group_capabilities AS links
            INNER JOIN legacy_capabilities AS capabilities
                ON capabilities.id = links.capability_id
            WHERE links.group_id = $1
            ORDER BY capabilities.codename
            "#,
        )
        .bind(group_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list legacy group capabilities: {error}"))
        })?;

        Ok(rows.into_iter().map(LegacyCapability::from).collect())
    }

    async fn add_group_capabilities(
        &self,
        group_id: LegacyGroupId,
        capability_ids: &[LegacyCapabilityId],
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO legacy_group_capabilities (group_id, capability_id)
            SELECT $1, capability.id
            FROM UNNEST($2::bigint[]) AS capability(id)
            ON CONFLICT (group_id, capability_id) DO NOTHING
            "#,
        )
        .bind(group_id.as_i64())
        .bind(capability_keys(capability_ids))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to add legacy group capabilities: {error}"))
        })?;

        Ok(())
    }

    async fn remove_group_capabilities(
        &self,
        group_id: LegacyGroupId,
        capability_ids: &[LegacyCapabilityId],
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM legacy_group_capabilities
            WHERE group_id = $1 AND capability_id = ANY($2)
            "#,
        )
        .bind(group_id.as_i64())
        .bind(capability_keys(capability_ids))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove legacy group capabilities: {error}"))
        })?;

        Ok(())
    }

    async fn list_group_members(&self, group_id: LegacyGroupId) -> AppResult<Vec<UserId>> {
        let user_ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT user_id
            FROM legacy_group_members
            WHERE group_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(group_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list legacy group members: {error}"))
        })?;

        Ok(user_ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn add_group_member(&self, group_id: LegacyGroupId, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO legacy_group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id.as_i64())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to add legacy group member: {error}"))
        })?;

        Ok(())
    }

    async fn remove_group_member(&self, group_id: LegacyGroupId, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM legacy_group_members
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id.as_i64())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove legacy group member: {error}"))
        })?;

        Ok(())
    }
}
