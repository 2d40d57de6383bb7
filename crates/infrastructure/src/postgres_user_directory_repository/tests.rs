use warden_application::{AccountChanges, NewUserAccount, UserDirectoryRepository};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{EmailAddress, EmployeeId, UserAccount, Username};

use super::PostgresUserDirectoryRepository;
use crate::postgres_test_support::{create_user, test_pool, unique};

fn new_account(username: &str, employee_id: Option<EmployeeId>) -> AppResult<NewUserAccount> {
    Ok(NewUserAccount {
        username: Username::new(username)?,
        email: Some(EmailAddress::new("agent@example.com")?),
        first_name: "Dana".to_owned(),
        last_name: "Reyes".to_owned(),
        employee_id,
        position: Some("Agent".to_owned()),
        department: None,
        phone: None,
        is_staff: false,
        is_superuser: false,
        password_hash: "$argon2id$stub".to_owned(),
    })
}

fn changes_from(account: &UserAccount) -> AccountChanges {
    AccountChanges {
        username: account.username.clone(),
        email: account.email.clone(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        employee_id: account.employee_id.clone(),
        position: account.position.clone(),
        department: account.department.clone(),
        phone: account.phone.clone(),
        is_active: account.is_active,
        is_staff: account.is_staff,
        is_superuser: account.is_superuser,
    }
}

#[tokio::test]
async fn credentials_lookup_returns_the_stored_hash() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let directory = PostgresUserDirectoryRepository::new(pool);
    let username = unique("dana");
    let created = directory
        .create_user(new_account(username.as_str(), None)?)
        .await?;

    assert!(created.is_active);
    assert_eq!(created.username.as_str(), username);

    let credentials = directory.find_credentials(username.as_str()).await?;
    let Some(credentials) = credentials else {
        panic!("expected credentials for {username}");
    };
    assert_eq!(credentials.account.id, created.id);
    assert_eq!(credentials.password_hash.as_deref(), Some("$argon2id$stub"));

    let found = directory.find_user(created.id).await?;
    assert_eq!(found.map(|account| account.id), Some(created.id));
    assert!(directory.find_credentials("nobody-here").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn duplicate_username_or_employee_id_is_a_conflict() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let directory = PostgresUserDirectoryRepository::new(pool);
    let username = unique("erin");
    let employee_number = format!("E{}", &unique("x")[2..12]);

    directory
        .create_user(new_account(
            username.as_str(),
            Some(EmployeeId::new(employee_number.as_str())?),
        )?)
        .await?;

    let same_username = directory
        .create_user(new_account(username.as_str(), None)?)
        .await;
    assert!(matches!(same_username, Err(AppError::Conflict(_))));

    let same_employee = directory
        .create_user(new_account(
            unique("frank").as_str(),
            Some(EmployeeId::new(employee_number.as_str())?),
        )?)
        .await;
    assert!(matches!(same_employee, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn update_and_delete_user_rows() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let directory = PostgresUserDirectoryRepository::new(pool.clone());
    let frank = create_user(&pool, "frank").await;
    let gina = create_user(&pool, "gina").await;

    let updated = directory
        .update_user(
            frank.id,
            AccountChanges {
                department: Some("Support".to_owned()),
                is_active: false,
                ..changes_from(&frank)
            },
        )
        .await?;
    let Some(updated) = updated else {
        panic!("expected {} to be updated", frank.username.as_str());
    };
    assert_eq!(updated.department.as_deref(), Some("Support"));
    assert!(!updated.is_active);
    assert_eq!(updated.date_joined, frank.date_joined);

    let taken = directory
        .update_user(
            frank.id,
            AccountChanges {
                username: gina.username.clone(),
                ..changes_from(&updated)
            },
        )
        .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));
    assert!(
        directory
            .update_user(UserId::new(), changes_from(&frank))
            .await?
            .is_none()
    );

    assert!(directory.delete_user(frank.id).await?);
    assert!(directory.find_user(frank.id).await?.is_none());
    assert!(!directory.delete_user(frank.id).await?);

    Ok(())
}
