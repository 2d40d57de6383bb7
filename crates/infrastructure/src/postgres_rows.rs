//! Row shapes shared by the PostgreSQL repositories.
//!
//! Joined queries alias grant columns with a `grant_` prefix so that grant
//! rows can be flattened next to the role, permission or user they point at.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    EmailAddress, EmployeeId, GrantId, LegacyGroupId, Permission, PermissionCategory,
    PermissionId, PermissionName, Project, ProjectAssignment, ProjectId, Role, RoleColor, RoleId,
    RoleName, RolePermissionGrant, UserAccount, UserRoleGrant, Username,
};

fn stored<T>(value: AppResult<T>, column: &str) -> AppResult<T> {
    value.map_err(|error| AppError::Internal(format!("stored {column} is invalid: {error}")))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) email: Option<String>,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) employee_id: Option<String>,
    pub(crate) position: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) is_superuser: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_active: bool,
    pub(crate) date_joined: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_account(self) -> AppResult<UserAccount> {
        Ok(UserAccount {
            id: UserId::from_uuid(self.id),
            username: stored(Username::new(self.username), "username")?,
            email: stored(self.email.map(EmailAddress::new).transpose(), "email")?,
            first_name: self.first_name,
            last_name: self.last_name,
            employee_id: stored(
                self.employee_id.map(EmployeeId::new).transpose(),
                "employee id",
            )?,
            position: self.position,
            department: self.department,
            phone: self.phone,
            is_superuser: self.is_superuser,
            is_staff: self.is_staff,
            is_active: self.is_active,
            date_joined: self.date_joined,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) color: String,
    pub(crate) is_active: bool,
    pub(crate) legacy_group_id: Option<i64>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl RoleRow {
    pub(crate) fn into_role(self) -> AppResult<Role> {
        Ok(Role {
            id: RoleId::from_uuid(self.id),
            name: stored(RoleName::new(self.name), "role name")?,
            description: self.description,
            color: stored(RoleColor::new(self.color), "role color")?,
            is_active: self.is_active,
            legacy_group_id: self.legacy_group_id.map(LegacyGroupId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl PermissionRow {
    pub(crate) fn into_permission(self) -> AppResult<Permission> {
        Ok(Permission {
            id: PermissionId::from_uuid(self.id),
            name: stored(PermissionName::new(self.name), "permission name")?,
            description: self.description,
            category: stored(
                self.category.map(PermissionCategory::new).transpose(),
                "permission category",
            )?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRoleGrantRow {
    pub(crate) grant_id: Uuid,
    pub(crate) grant_user_id: Uuid,
    pub(crate) grant_role_id: Uuid,
    pub(crate) grant_assigned_by: Option<Uuid>,
    pub(crate) grant_assigned_at: DateTime<Utc>,
    pub(crate) grant_expires_at: Option<DateTime<Utc>>,
    pub(crate) grant_is_active: bool,
}

impl From<UserRoleGrantRow> for UserRoleGrant {
    fn from(row: UserRoleGrantRow) -> Self {
        Self {
            id: GrantId::from_uuid(row.grant_id),
            user_id: UserId::from_uuid(row.grant_user_id),
            role_id: RoleId::from_uuid(row.grant_role_id),
            assigned_by: row.grant_assigned_by.map(UserId::from_uuid),
            assigned_at: row.grant_assigned_at,
            expires_at: row.grant_expires_at,
            is_active: row.grant_is_active,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RolePermissionGrantRow {
    pub(crate) grant_id: Uuid,
    pub(crate) grant_role_id: Uuid,
    pub(crate) grant_permission_id: Uuid,
    pub(crate) grant_granted_by: Option<Uuid>,
    pub(crate) grant_granted_at: DateTime<Utc>,
    pub(crate) grant_is_active: bool,
}

impl From<RolePermissionGrantRow> for RolePermissionGrant {
    fn from(row: RolePermissionGrantRow) -> Self {
        Self {
            id: GrantId::from_uuid(row.grant_id),
            role_id: RoleId::from_uuid(row.grant_role_id),
            permission_id: PermissionId::from_uuid(row.grant_permission_id),
            granted_by: row.grant_granted_by.map(UserId::from_uuid),
            granted_at: row.grant_granted_at,
            is_active: row.grant_is_active,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProjectRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) member_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            member_count: u32::try_from(row.member_count).unwrap_or(u32::MAX),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProjectAssignmentRow {
    pub(crate) project_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) assigned_at: DateTime<Utc>,
    pub(crate) is_active: bool,
}

impl From<ProjectAssignmentRow> for ProjectAssignment {
    fn from(row: ProjectAssignmentRow) -> Self {
        Self {
            project_id: ProjectId::from_uuid(row.project_id),
            user_id: UserId::from_uuid(row.user_id),
            assigned_at: row.assigned_at,
            is_active: row.is_active,
        }
    }
}
