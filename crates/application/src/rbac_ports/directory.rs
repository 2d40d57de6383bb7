use async_trait::async_trait;
use warden_core::{AppResult, UserId};
use warden_domain::{EmailAddress, EmployeeId, UserAccount, Username};

/// Account attributes persisted by [`UserDirectoryRepository::create_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    /// Unique login name.
    pub username: Username,
    /// Optional contact email.
    pub email: Option<EmailAddress>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional unique employee number.
    pub employee_id: Option<EmployeeId>,
    /// Job title.
    pub position: Option<String>,
    /// Organisational unit.
    pub department: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Staff override flag.
    pub is_staff: bool,
    /// Superuser override flag.
    pub is_superuser: bool,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Full set of editable account attributes written by
/// [`UserDirectoryRepository::update_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanges {
    /// Unique login name.
    pub username: Username,
    /// Optional contact email.
    pub email: Option<EmailAddress>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional unique employee number.
    pub employee_id: Option<EmployeeId>,
    /// Job title.
    pub position: Option<String>,
    /// Organisational unit.
    pub department: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// Staff override flag.
    pub is_staff: bool,
    /// Superuser override flag.
    pub is_superuser: bool,
}

/// Account plus stored password hash, used only by login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// Directory account.
    pub account: UserAccount,
    /// Stored password hash, absent for accounts without a password.
    pub password_hash: Option<String>,
}

/// Repository port for the user directory.
#[async_trait]
pub trait UserDirectoryRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Finds login credentials by username.
    async fn find_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>>;

    /// Creates a new account. Duplicate usernames or employee ids are conflicts.
    async fn create_user(&self, input: NewUserAccount) -> AppResult<UserAccount>;

    /// Lists all accounts ordered by username.
    async fn list_users(&self) -> AppResult<Vec<UserAccount>>;

    /// Overwrites the editable attributes of an account.
    ///
    /// Returns `None` when the account does not exist. Duplicate usernames
    /// or employee ids are conflicts.
    async fn update_user(
        &self,
        user_id: UserId,
        changes: AccountChanges,
    ) -> AppResult<Option<UserAccount>>;

    /// Deletes an account together with its grants, assignments and mirror
    /// memberships. Returns whether a row was deleted.
    async fn delete_user(&self, user_id: UserId) -> AppResult<bool>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
