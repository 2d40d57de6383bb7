use sqlx::PgPool;
use warden_application::{
    AccessGate, BootstrapService, GrantService, MirrorSyncService, PermissionResolver,
    ProjectService, SecurityAdminService, SessionService, UserAdminService,
};
use warden_core::AppError;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod repositories;

pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let repositories = repositories::build_repository_set(&pool);

    let policy = config
        .rbac_policy
        .clone()
        .resolve(repositories.role_repository.as_ref())
        .await?;

    let resolver = PermissionResolver::new(
        repositories.user_repository.clone(),
        repositories.grant_repository.clone(),
    );
    let gate = AccessGate::new(resolver.clone(), repositories.project_repository.clone());
    let mirror_sync_service = MirrorSyncService::new(
        repositories.role_repository.clone(),
        repositories.permission_repository.clone(),
        repositories.grant_repository.clone(),
        repositories.legacy_auth_repository.clone(),
    );
    let grant_service = GrantService::new(
        repositories.user_repository.clone(),
        repositories.role_repository.clone(),
        repositories.permission_repository.clone(),
        repositories.grant_repository.clone(),
        repositories.password_hasher.clone(),
        mirror_sync_service.clone(),
        policy,
    );

    Ok(AppState {
        security_admin_service: SecurityAdminService::new(
            gate.clone(),
            repositories.role_repository.clone(),
            repositories.permission_repository.clone(),
            repositories.grant_repository.clone(),
            grant_service.clone(),
            mirror_sync_service.clone(),
            repositories.audit_repository.clone(),
        ),
        user_admin_service: UserAdminService::new(
            gate.clone(),
            repositories.user_repository.clone(),
            grant_service.clone(),
            repositories.audit_repository.clone(),
        ),
        project_service: ProjectService::new(
            gate.clone(),
            repositories.project_repository.clone(),
            repositories.user_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        session_service: SessionService::new(
            repositories.user_repository.clone(),
            repositories.password_hasher.clone(),
            resolver,
        ),
        bootstrap_service: BootstrapService::new(
            repositories.role_repository.clone(),
            repositories.permission_repository.clone(),
            repositories.grant_repository.clone(),
            mirror_sync_service.clone(),
            repositories.audit_repository,
        ),
        access_gate: gate,
        grant_service,
        mirror_sync_service,
        user_repository: repositories.user_repository,
        role_repository: repositories.role_repository,
        frontend_url: config.frontend_url.clone(),
    })
}
