use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::{Permission, PermissionCategory, PermissionId, PermissionName};

/// Input payload for creating permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique permission name.
    pub name: PermissionName,
    /// Optional description.
    pub description: Option<String>,
    /// Optional category.
    pub category: Option<PermissionCategory>,
    /// Activation flag.
    pub is_active: bool,
}

/// Repository port for the permission catalog.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds a permission by identifier.
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>>;

    /// Finds a permission by exact name.
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Lists all permissions ordered by category then name.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Creates a permission. Duplicate names are conflicts.
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission>;

    /// Lists distinct categories of active permissions.
    async fn list_categories(&self) -> AppResult<Vec<String>>;
}
