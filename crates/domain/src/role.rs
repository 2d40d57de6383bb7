use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AppError, AppResult};

use crate::LegacyGroupId;

/// Maximum role name length.
pub const ROLE_NAME_MAX_LENGTH: usize = 100;

/// Color used when a role is created without one.
pub const DEFAULT_ROLE_COLOR: &str = "#007bff";

/// Prefix of the mirror group derived from a role name.
pub const LEGACY_GROUP_PREFIX: &str = "role_";

/// Stable role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a role identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid role id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated unique role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a trimmed role name of at most [`ROLE_NAME_MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }

        if trimmed.chars().count() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Badge color stored as `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleColor(String);

impl RoleColor {
    /// Creates a lowercased hex color.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let is_hex = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed[1..].chars().all(|character| character.is_ascii_hexdigit());

        if !is_hex {
            return Err(AppError::Validation(format!(
                "role color '{trimmed}' must be a hex value like '{DEFAULT_ROLE_COLOR}'"
            )));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the hex color.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RoleColor {
    fn default() -> Self {
        Self(DEFAULT_ROLE_COLOR.to_owned())
    }
}

/// Named, colored, activatable label granted to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: RoleName,
    /// Optional description.
    pub description: Option<String>,
    /// Badge color.
    pub color: RoleColor,
    /// Inactive roles contribute nothing to access decisions.
    pub is_active: bool,
    /// Mirror group, when one was created by a sync.
    pub legacy_group_id: Option<LegacyGroupId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Returns the deterministic mirror group name for this role.
    #[must_use]
    pub fn legacy_group_name(&self) -> String {
        legacy_group_name_for(self.name.as_str())
    }
}

/// Derives the mirror group name for a role name.
#[must_use]
pub fn legacy_group_name_for(role_name: &str) -> String {
    format!("{LEGACY_GROUP_PREFIX}{role_name}")
}
