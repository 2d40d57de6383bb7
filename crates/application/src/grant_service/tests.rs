use chrono::{Duration, Utc};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::RoleId;

use crate::test_support::TestServices;
use crate::{
    AssignRoleInput, CreateUserInput, MirrorStatus, RbacPolicy, RbacPolicySettings,
    UpsertUserRoleGrant, UserDirectoryRepository,
};

fn assignment(user_id: UserId, role_id: RoleId) -> AssignRoleInput {
    AssignRoleInput {
        user_id,
        role_id,
        assigned_by: None,
        expires_at: None,
    }
}

fn new_user(username: &str, role_id: Option<RoleId>) -> CreateUserInput {
    CreateUserInput {
        username: username.to_owned(),
        first_name: "New".to_owned(),
        last_name: "Agent".to_owned(),
        password: "correct horse battery".to_owned(),
        role_id,
        ..CreateUserInput::default()
    }
}

#[tokio::test]
async fn assigning_twice_keeps_one_active_row() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services.store.active_user("alice").await;
    let role = services.store.add_role("Agent", true).await;

    services.grants.assign_role(assignment(alice.id, role.id)).await?;
    services.grants.assign_role(assignment(alice.id, role.id)).await?;

    assert_eq!(services.store.active_user_role_rows(alice.id, role.id).await, 1);
    assert_eq!(services.store.state.lock().await.user_roles.len(), 1);
    Ok(())
}

#[tokio::test]
async fn reassigning_reactivates_and_refreshes_expiry() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services.store.active_user("alice").await;
    let role = services.store.add_role("Agent", true).await;
    let revoked = services
        .store
        .add_user_role(alice.id, role.id, Some(Utc::now() + Duration::hours(1)), false)
        .await;

    let outcome = services.grants.assign_role(assignment(alice.id, role.id)).await?;

    assert_eq!(outcome.value.id, revoked.id);
    assert!(outcome.value.is_active);
    assert_eq!(outcome.value.expires_at, None);
    assert!(services.resolver.has_role(alice.id, "Agent").await?);
    Ok(())
}

#[tokio::test]
async fn assign_rejects_missing_inactive_and_past_expiry() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services.store.active_user("alice").await;
    let retired = services.store.add_role("Retired", true).await;
    let active = services.store.add_role("Agent", true).await;
    services.store.set_role_active(retired.id, false).await;

    let inactive_role = services.grants.assign_role(assignment(alice.id, retired.id)).await;
    let unknown_user = services
        .grants
        .assign_role(assignment(UserId::new(), active.id))
        .await;
    let past_expiry = services
        .grants
        .assign_role(AssignRoleInput {
            expires_at: Some(Utc::now() - Duration::minutes(5)),
            ..assignment(alice.id, active.id)
        })
        .await;

    assert!(matches!(inactive_role, Err(AppError::NotFound(_))));
    assert!(matches!(unknown_user, Err(AppError::NotFound(_))));
    assert!(matches!(past_expiry, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn assign_updates_membership_of_linked_roles_only() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services.store.active_user("alice").await;
    let linked = services.store.add_role("Agent", true).await;
    let unlinked = services.store.add_role("Trainee", true).await;
    services.mirror.sync_role(linked.id).await?;

    let linked_outcome = services.grants.assign_role(assignment(alice.id, linked.id)).await?;
    let unlinked_outcome = services
        .grants
        .assign_role(assignment(alice.id, unlinked.id))
        .await?;

    assert_eq!(linked_outcome.mirror, MirrorStatus::Synced);
    assert_eq!(unlinked_outcome.mirror, MirrorStatus::NotLinked);
    assert!(services.store.group_member_ids(linked.id).await.contains(&alice.id));

    services.grants.revoke_role(alice.id, linked.id).await?;
    assert!(services.store.group_member_ids(linked.id).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn revoke_without_active_grant_is_not_found() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services.store.active_user("alice").await;
    let role = services.store.add_role("Agent", true).await;
    services.store.add_user_role(alice.id, role.id, None, false).await;

    let result = services.grants.revoke_role(alice.id, role.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn grant_rejects_inactive_permission_and_revoke_requires_grant() -> AppResult<()> {
    let services = TestServices::new();
    let role = services.store.add_role("Editor", true).await;
    let permission = services.store.add_permission("project_edit", None).await;
    services.store.set_permission_active(permission.id, false).await;

    let granted = services
        .grants
        .grant_permission(role.id, permission.id, None)
        .await;
    let revoked = services
        .grants
        .revoke_permission(role.id, permission.id)
        .await;

    assert!(matches!(granted, Err(AppError::NotFound(_))));
    assert!(matches!(revoked, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn protected_roles_cannot_be_deleted() -> AppResult<()> {
    let services = TestServices::new();
    let admin_role = services.store.add_role("System Administrator", true).await;
    let basic = services.store.add_role("Basic User", true).await;
    let alice = services.store.active_user("alice").await;
    services.store.add_user_role(alice.id, admin_role.id, None, true).await;

    for role_id in [admin_role.id, basic.id] {
        let result = services.grants.delete_role(role_id, None).await;
        assert!(matches!(result, Err(AppError::ProtectedResource(_))));
    }
    assert!(services.store.find_role_row(admin_role.id).await.is_some());
    Ok(())
}

#[tokio::test]
async fn deleting_role_reassigns_holders_to_fallback() -> AppResult<()> {
    let services = TestServices::new();
    let fallback = services.store.add_role("Basic User", true).await;
    let role = services.store.add_role("Night Shift", true).await;
    let mut holders = Vec::new();
    for username in ["alice", "bob", "carol"] {
        let user = services.store.active_user(username).await;
        services.store.add_user_role(user.id, role.id, None, true).await;
        holders.push(user.id);
    }
    let expired = services.store.active_user("dave").await;
    services
        .store
        .add_user_role(expired.id, role.id, Some(Utc::now() - Duration::days(1)), true)
        .await;

    let outcome = services.grants.delete_role(role.id, None).await?;

    let mut reassigned = outcome.value.reassigned_user_ids.clone();
    reassigned.sort();
    holders.sort();
    assert_eq!(reassigned, holders);
    assert_eq!(outcome.value.fallback_role_id, Some(fallback.id));
    assert!(services.store.find_role_row(role.id).await.is_none());
    for user_id in holders {
        assert!(services.resolver.has_role(user_id, "Basic User").await?);
    }
    assert!(!services.resolver.has_role(expired.id, "Basic User").await?);
    Ok(())
}

#[tokio::test]
async fn deleting_role_without_holders_needs_no_fallback() -> AppResult<()> {
    let services = TestServices::new();
    let role = services.store.add_role("Unused", true).await;

    let outcome = services.grants.delete_role(role.id, None).await?;

    assert!(outcome.value.reassigned_user_ids.is_empty());
    assert_eq!(outcome.value.fallback_role_id, None);
    assert!(services.store.find_role_row(role.id).await.is_none());
    Ok(())
}

#[tokio::test]
async fn holder_added_after_the_precheck_still_reaches_the_fallback() -> AppResult<()> {
    let services = TestServices::new();
    let fallback = services.store.add_role("Basic User", true).await;
    let role = services.store.add_role("Night Shift", true).await;
    let late = services.store.active_user("late").await;
    services.store.state.lock().await.assign_before_delete = Some(UpsertUserRoleGrant {
        user_id: late.id,
        role_id: role.id,
        assigned_by: None,
        expires_at: None,
    });

    let outcome = services.grants.delete_role(role.id, None).await?;

    assert_eq!(outcome.value.reassigned_user_ids, vec![late.id]);
    assert_eq!(outcome.value.fallback_role_id, Some(fallback.id));
    assert!(services.resolver.has_role(late.id, "Basic User").await?);
    Ok(())
}

#[tokio::test]
async fn deleting_held_role_without_usable_fallback_is_a_configuration_error() -> AppResult<()> {
    let services = TestServices::new();
    let role = services.store.add_role("Night Shift", true).await;
    let alice = services.store.active_user("alice").await;
    services.store.add_user_role(alice.id, role.id, None, true).await;

    let missing = services.grants.delete_role(role.id, None).await;
    assert!(matches!(missing, Err(AppError::Configuration(_))));

    let fallback = services.store.add_role("Basic User", false).await;
    let inactive = services.grants.delete_role(role.id, None).await;
    assert!(matches!(inactive, Err(AppError::Configuration(_))));

    services.store.set_role_active(fallback.id, true).await;
    services.grants.delete_role(role.id, None).await?;
    Ok(())
}

#[tokio::test]
async fn fallback_may_not_be_the_deleted_role() -> AppResult<()> {
    let settings = RbacPolicySettings {
        fallback_role_name: "Night Shift".to_owned(),
        ..RbacPolicySettings::default()
    };
    let services = TestServices::with_policy(RbacPolicy::new(settings, None, None));
    let role = services.store.add_role("Night Shift", true).await;
    let alice = services.store.active_user("alice").await;
    services.store.add_user_role(alice.id, role.id, None, true).await;

    let result = services.grants.delete_role(role.id, None).await;
    assert!(matches!(result, Err(AppError::Configuration(_))));
    Ok(())
}

#[tokio::test]
async fn create_user_uses_requested_active_role() -> AppResult<()> {
    let services = TestServices::new();
    services.store.add_role("Basic User", true).await;
    let agent = services.store.add_role("Agent", true).await;

    let outcome = services
        .grants
        .create_user(new_user("newagent", Some(agent.id)), None)
        .await?;

    assert_eq!(outcome.value.role.map(|role| role.id), Some(agent.id));
    assert!(services.resolver.has_role(outcome.value.account.id, "Agent").await?);
    Ok(())
}

#[tokio::test]
async fn create_user_falls_back_to_default_role() -> AppResult<()> {
    let services = TestServices::new();
    let basic = services.store.add_role("Basic User", true).await;
    let retired = services.store.add_role("Retired", false).await;

    let outcome = services
        .grants
        .create_user(new_user("newagent", Some(retired.id)), None)
        .await?;

    assert_eq!(outcome.value.role.map(|role| role.id), Some(basic.id));
    Ok(())
}

#[tokio::test]
async fn create_user_without_any_role_is_tolerated() -> AppResult<()> {
    let services = TestServices::new();

    let outcome = services
        .grants
        .create_user(new_user("loner", None), None)
        .await?;

    assert!(outcome.value.role.is_none());
    assert_eq!(outcome.mirror, MirrorStatus::NotLinked);
    assert!(services
        .resolver
        .effective_permissions(outcome.value.account.id)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn create_user_hashes_password_and_validates_input() -> AppResult<()> {
    let services = TestServices::new();

    let created = services
        .grants
        .create_user(new_user("hashed", None), None)
        .await?;
    let credentials = services.store.find_credentials("hashed").await?;
    assert_eq!(
        credentials.and_then(|credentials| credentials.password_hash),
        Some("fake$correct horse battery".to_owned())
    );
    assert!(created.value.account.is_active);

    let weak = services
        .grants
        .create_user(
            CreateUserInput {
                password: "short".to_owned(),
                ..new_user("weak", None)
            },
            None,
        )
        .await;
    let duplicate = services
        .grants
        .create_user(new_user("hashed", None), None)
        .await;

    assert!(matches!(weak, Err(AppError::Validation(_))));
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    Ok(())
}
