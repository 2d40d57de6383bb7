use std::sync::Arc;

use warden_application::{
    AccessGate, BootstrapService, GrantService, MirrorSyncService, ProjectService, RoleRepository,
    SecurityAdminService, SessionService, UserAdminService, UserDirectoryRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub security_admin_service: SecurityAdminService,
    pub user_admin_service: UserAdminService,
    pub project_service: ProjectService,
    pub session_service: SessionService,
    pub bootstrap_service: BootstrapService,
    pub access_gate: AccessGate,
    pub grant_service: GrantService,
    pub mirror_sync_service: MirrorSyncService,
    pub user_repository: Arc<dyn UserDirectoryRepository>,
    pub role_repository: Arc<dyn RoleRepository>,
    pub frontend_url: String,
}
