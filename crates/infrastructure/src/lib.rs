//! PostgreSQL and Argon2 adapters for the application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod postgres_audit_repository;
mod postgres_grant_repository;
mod postgres_legacy_auth_repository;
mod postgres_permission_repository;
mod postgres_project_repository;
mod postgres_role_repository;
mod postgres_rows;
mod postgres_user_directory_repository;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_grant_repository::PostgresGrantRepository;
pub use postgres_legacy_auth_repository::PostgresLegacyAuthRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_directory_repository::PostgresUserDirectoryRepository;

/// Embedded schema migrations for the RBAC tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
