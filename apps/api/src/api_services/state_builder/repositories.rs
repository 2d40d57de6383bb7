use std::sync::Arc;

use sqlx::PgPool;
use warden_infrastructure::{
    Argon2PasswordHasher, PostgresAuditRepository, PostgresGrantRepository,
    PostgresLegacyAuthRepository, PostgresPermissionRepository, PostgresProjectRepository,
    PostgresRoleRepository, PostgresUserDirectoryRepository,
};

pub(super) struct RepositorySet {
    pub(super) user_repository: Arc<PostgresUserDirectoryRepository>,
    pub(super) role_repository: Arc<PostgresRoleRepository>,
    pub(super) permission_repository: Arc<PostgresPermissionRepository>,
    pub(super) grant_repository: Arc<PostgresGrantRepository>,
    pub(super) legacy_auth_repository: Arc<PostgresLegacyAuthRepository>,
    pub(super) project_repository: Arc<PostgresProjectRepository>,
    pub(super) audit_repository: Arc<PostgresAuditRepository>,
    pub(super) password_hasher: Arc<Argon2PasswordHasher>,
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    RepositorySet {
        user_repository: Arc::new(PostgresUserDirectoryRepository::new(pool.clone())),
        role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
        permission_repository: Arc::new(PostgresPermissionRepository::new(pool.clone())),
        grant_repository: Arc::new(PostgresGrantRepository::new(pool.clone())),
        legacy_auth_repository: Arc::new(PostgresLegacyAuthRepository::new(pool.clone())),
        project_repository: Arc::new(PostgresProjectRepository::new(pool.clone())),
        audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
    }
}
