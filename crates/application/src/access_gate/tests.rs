use warden_core::{AppError, AppResult, UserId};
use warden_domain::{AdminPermission, ProjectId};

use crate::test_support::{TestServices, identity};
use crate::{AccessGate, OwnedResource};

#[test]
fn missing_identity_is_unauthenticated() {
    let result = AccessGate::require_authenticated(None);
    assert!(matches!(result, Err(AppError::Unauthenticated(_))));
}

#[tokio::test]
async fn require_permission_allows_granted_user() -> AppResult<()> {
    let services = TestServices::new();
    let manager = services
        .user_with_permissions("manager", &["role_management"])
        .await;

    services
        .gate
        .require_admin(&identity(&manager), AdminPermission::RoleManagement)
        .await
}

#[tokio::test]
async fn require_permission_denies_with_uniform_message() {
    let services = TestServices::new();
    let agent = services.store.active_user("agent").await;

    let result = services
        .gate
        .require_permission(&identity(&agent), "role_management")
        .await;

    match result {
        Err(AppError::Forbidden(message)) => assert_eq!(message, "insufficient permission"),
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn staff_bypasses_permission_checks() -> AppResult<()> {
    let services = TestServices::new();
    let staff = services.store.add_user("staff", false, true, true).await;

    services
        .gate
        .require_permission(&identity(&staff), "project.project_delete")
        .await?;
    assert!(services.gate.is_privileged(&identity(&staff)).await?);
    Ok(())
}

#[tokio::test]
async fn project_ownership_requires_active_assignment() -> AppResult<()> {
    let services = TestServices::new();
    let agent = services.store.active_user("agent").await;
    let assigned = services.store.add_project("Inbound").await;
    let former = services.store.add_project("Outbound").await;
    services.store.add_assignment(assigned.id, agent.id, true).await;
    services.store.add_assignment(former.id, agent.id, false).await;

    services
        .gate
        .require_object_ownership(&identity(&agent), OwnedResource::Project(assigned.id))
        .await?;

    for project_id in [former.id, ProjectId::new()] {
        let result = services
            .gate
            .require_object_ownership(&identity(&agent), OwnedResource::Project(project_id))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
    Ok(())
}

#[tokio::test]
async fn user_ownership_allows_self_and_privileged() -> AppResult<()> {
    let services = TestServices::new();
    let agent = services.store.active_user("agent").await;
    let other = services.store.active_user("other").await;
    let superuser = services.store.add_user("root", true, false, true).await;

    services
        .gate
        .require_object_ownership(&identity(&agent), OwnedResource::User(agent.id))
        .await?;
    services
        .gate
        .require_object_ownership(&identity(&superuser), OwnedResource::User(agent.id))
        .await?;

    let result = services
        .gate
        .require_object_ownership(&identity(&other), OwnedResource::User(agent.id))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn inactive_or_unknown_accounts_own_nothing() {
    let services = TestServices::new();
    let former = services.store.add_user("former", true, false, false).await;
    let ghost = warden_core::UserIdentity::new(UserId::new(), "ghost");

    let inactive = services
        .gate
        .require_object_ownership(&identity(&former), OwnedResource::User(former.id))
        .await;
    let unknown = services
        .gate
        .require_object_ownership(&ghost, OwnedResource::User(ghost.user_id()))
        .await;

    assert!(matches!(inactive, Err(AppError::Forbidden(_))));
    assert!(matches!(unknown, Err(AppError::Forbidden(_))));
}
