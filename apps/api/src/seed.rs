use tracing::info;
use warden_application::{CreateUserInput, RoleRepository, UserDirectoryRepository};
use warden_core::AppResult;

use crate::api_config::SeedAdminConfig;
use crate::state::AppState;

const ADMIN_ROLE_NAME: &str = "System Administrator";

/// Seeds the default catalog and, when configured, the first superuser.
pub async fn run(app_state: &AppState, seed_admin: Option<&SeedAdminConfig>) -> AppResult<()> {
    let report = app_state.bootstrap_service.seed().await?;
    info!(
        permissions_created = report.permissions_created,
        roles_created = report.roles_created,
        grants_created = report.grants_created,
        sync_failures = report.sync.failures.len(),
        "default catalog seeded"
    );

    if let Some(seed_admin) = seed_admin {
        ensure_admin_user(app_state, seed_admin).await?;
    }

    Ok(())
}

async fn ensure_admin_user(app_state: &AppState, seed_admin: &SeedAdminConfig) -> AppResult<()> {
    if app_state
        .user_repository
        .find_credentials(seed_admin.username.as_str())
        .await?
        .is_some()
    {
        info!(username = seed_admin.username.as_str(), "admin user already exists");
        return Ok(());
    }

    let admin_role = app_state
        .role_repository
        .find_role_by_name(ADMIN_ROLE_NAME)
        .await?;

    let outcome = app_state
        .grant_service
        .create_user(
            CreateUserInput {
                username: seed_admin.username.clone(),
                password: seed_admin.password.clone(),
                first_name: "Administrator".to_owned(),
                is_staff: true,
                is_superuser: true,
                role_id: admin_role.map(|role| role.id),
                ..CreateUserInput::default()
            },
            None,
        )
        .await?;

    info!(
        user_id = %outcome.value.account.id,
        username = outcome.value.account.username.as_str(),
        "admin user created"
    );

    Ok(())
}
