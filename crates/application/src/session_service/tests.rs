use std::collections::BTreeSet;

use warden_core::{AppError, AppResult};

use crate::test_support::TestServices;

#[tokio::test]
async fn valid_credentials_produce_an_identity() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services.store.active_user("alice").await;

    let identity = services
        .sessions()
        .authenticate(" alice ", "alice-password")
        .await?;

    assert_eq!(identity.user_id(), alice.id);
    assert_eq!(identity.username(), "alice");
    Ok(())
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let services = TestServices::new();
    services.store.active_user("alice").await;
    services.store.add_user("former", false, false, false).await;
    let sessions = services.sessions();

    let attempts = [
        sessions.authenticate("alice", "wrong-password").await,
        sessions.authenticate("nobody", "whatever-password").await,
        sessions.authenticate("former", "former-password").await,
    ];

    for attempt in attempts {
        match attempt {
            Err(AppError::Unauthenticated(message)) => {
                assert_eq!(message, "invalid username or password");
            }
            other => panic!("expected unauthenticated, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn profile_lists_effective_roles_and_permissions() -> AppResult<()> {
    let services = TestServices::new();
    let alice = services
        .user_with_permissions("alice", &["project_view", "dashboard_access"])
        .await;
    let identity = services
        .sessions()
        .authenticate("alice", "alice-password")
        .await?;

    let profile = services.sessions().profile(&identity).await?;

    assert_eq!(profile.account.id, alice.id);
    assert_eq!(profile.roles.len(), 1);
    assert_eq!(
        profile.permissions,
        BTreeSet::from(["dashboard_access".to_owned(), "project_view".to_owned()])
    );

    services.store.set_user_active(alice.id, false).await;
    let signed_out = services.sessions().profile(&identity).await;
    assert!(matches!(signed_out, Err(AppError::Unauthenticated(_))));
    Ok(())
}
