//! User account types and validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, UserId};

/// Maximum username length accepted by the directory.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Maximum employee identifier length.
pub const EMPLOYEE_ID_MAX_LENGTH: usize = 20;

/// Minimum password length for directory-managed accounts.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length (bounds Argon2 input size).
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validated login name.
///
/// Letters, digits and `@ . + - _` only, matching what the login form accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Creates a validated username.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "username must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > USERNAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "username must not exceed {USERNAME_MAX_LENGTH} characters"
            )));
        }

        if let Some(invalid) = trimmed
            .chars()
            .find(|character| !(character.is_alphanumeric() || "@.+-_".contains(*character)))
        {
            return Err(AppError::Validation(format!(
                "username contains invalid character '{invalid}'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated username.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a lowercased email address with one `@` and a dotted domain.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@' after a local part".to_owned(),
            ));
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one inner '.'".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Employee number, unique across accounts when present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Creates a validated employee identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "employee id must not be empty when provided".to_owned(),
            ));
        }

        if trimmed.chars().count() > EMPLOYEE_ID_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "employee id must not exceed {EMPLOYEE_ID_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the employee identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validates a plaintext password before hashing.
pub fn validate_password(password: &str, username: &str) -> AppResult<()> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    if password.eq_ignore_ascii_case(username) {
        return Err(AppError::Validation(
            "password must differ from the username".to_owned(),
        ));
    }

    Ok(())
}

/// Directory account as seen by access decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Stable account identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Optional contact email.
    pub email: Option<EmailAddress>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional employee number.
    pub employee_id: Option<EmployeeId>,
    /// Job title.
    pub position: Option<String>,
    /// Organisational unit.
    pub department: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Bypasses fine-grained permission checks.
    pub is_superuser: bool,
    /// Bypasses fine-grained permission checks.
    pub is_staff: bool,
    /// Inactive accounts are denied everything.
    pub is_active: bool,
    /// Account creation timestamp.
    pub date_joined: DateTime<Utc>,
}

impl UserAccount {
    /// Returns whether the superuser or staff override applies to this account.
    ///
    /// The override never applies to inactive accounts.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.is_active && (self.is_superuser || self.is_staff)
    }

    /// Returns `first last`, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full_name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full_name = full_name.trim();
        if full_name.is_empty() {
            self.username.as_str().to_owned()
        } else {
            full_name.to_owned()
        }
    }
}
