use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AppError, AppResult, UserId};

/// Maximum project name length.
pub const PROJECT_NAME_MAX_LENGTH: usize = 200;

/// Stable project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Creates a random project identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a project identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a project identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid project id '{value}': {error}"))
        })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validates a project name.
pub fn validate_project_name(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("project name must not be empty".to_owned()));
    }

    if trimmed.chars().count() > PROJECT_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "project name must not exceed {PROJECT_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_owned())
}

/// Work item that agents are assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Stable project identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Activation flag.
    pub is_active: bool,
    /// Number of active assignments held by active users.
    pub member_count: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Agent↔project link used for object-level ownership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAssignment {
    /// Assigned project.
    pub project_id: ProjectId,
    /// Assigned agent.
    pub user_id: UserId,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Soft-removal flag.
    pub is_active: bool,
}
