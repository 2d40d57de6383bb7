use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use warden_application::{NewUserAccount, UserDirectoryRepository};
use warden_domain::{UserAccount, Username};

use crate::{MIGRATOR, PostgresUserDirectoryRepository};

/// Connects to `DATABASE_URL` and runs migrations; `None` skips the test.
pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

/// Unique suffix so tests can share one database.
pub(crate) fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

pub(crate) async fn create_user(pool: &PgPool, prefix: &str) -> UserAccount {
    let username = unique(prefix);
    let created = PostgresUserDirectoryRepository::new(pool.clone())
        .create_user(NewUserAccount {
            username: Username::new(username.as_str())
                .unwrap_or_else(|error| panic!("invalid test username: {error}")),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            employee_id: None,
            position: None,
            department: None,
            phone: None,
            is_staff: false,
            is_superuser: false,
            password_hash: "unused".to_owned(),
        })
        .await;

    match created {
        Ok(account) => account,
        Err(error) => panic!("failed to create test user: {error}"),
    }
}
