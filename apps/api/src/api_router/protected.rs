use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub(super) fn build_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            put(handlers::security::update_role_handler)
                .delete(handlers::security::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/users",
            get(handlers::security::list_role_holders_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            get(handlers::security::list_role_permissions_handler)
                .post(handlers::security::grant_role_permission_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions/{permission_id}",
            delete(handlers::security::revoke_role_permission_handler),
        )
        .route(
            "/api/roles/{role_id}/sync",
            post(handlers::security::sync_role_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::security::list_permissions_handler)
                .post(handlers::security::create_permission_handler),
        )
        .route(
            "/api/permissions/categories",
            get(handlers::security::list_permission_categories_handler),
        )
        .route(
            "/api/permissions/{permission_id}/sync",
            post(handlers::security::sync_permission_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::users::list_user_roles_handler)
                .post(handlers::users::assign_user_role_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_id}",
            delete(handlers::users::revoke_user_role_handler),
        )
        .route(
            "/api/access/permissions",
            get(handlers::access::effective_permissions_handler),
        )
        .route(
            "/api/access/permissions/{permission_name}",
            get(handlers::access::check_permission_handler),
        )
        .route(
            "/api/projects",
            get(handlers::projects::list_projects_handler)
                .post(handlers::projects::create_project_handler),
        )
        .route(
            "/api/projects/{project_id}",
            get(handlers::projects::get_project_handler)
                .put(handlers::projects::update_project_handler)
                .delete(handlers::projects::delete_project_handler),
        )
        .route(
            "/api/projects/{project_id}/assignments",
            post(handlers::projects::assign_project_member_handler),
        )
        .route(
            "/api/projects/{project_id}/assignments/{user_id}",
            delete(handlers::projects::remove_project_member_handler),
        )
        .route("/api/admin/sync", post(handlers::security::sync_all_handler))
        .route_layer(from_fn(middleware::require_auth))
}
