use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AppError, AppResult};

/// Maximum permission name length.
pub const PERMISSION_NAME_MAX_LENGTH: usize = 100;

/// Maximum permission category length.
pub const PERMISSION_CATEGORY_MAX_LENGTH: usize = 50;

/// Stable permission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a permission identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid permission id '{value}': {error}"))
        })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Dot-free identifier segment shared by permission names and categories.
fn validate_segment(label: &str, value: &str, max_length: usize) -> AppResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{label} must not be empty")));
    }

    if trimmed.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "{label} must not exceed {max_length} characters"
        )));
    }

    if trimmed.contains('.') || trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "{label} '{trimmed}' must not contain '.' or whitespace"
        )));
    }

    Ok(trimmed.to_owned())
}

/// Unique capability name such as `project_edit`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionName(String);

impl PermissionName {
    /// Creates a validated permission name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validate_segment("permission name", &value.into(), PERMISSION_NAME_MAX_LENGTH).map(Self)
    }

    /// Returns the permission name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Grouping label such as `project` or `user`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionCategory(String);

impl PermissionCategory {
    /// Creates a validated permission category.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validate_segment(
            "permission category",
            &value.into(),
            PERMISSION_CATEGORY_MAX_LENGTH,
        )
        .map(Self)
    }

    /// Returns the category.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Named, categorized, activatable capability marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Unique permission name.
    pub name: PermissionName,
    /// Optional human description, used as the mirror capability label.
    pub description: Option<String>,
    /// Optional category.
    pub category: Option<PermissionCategory>,
    /// Inactive permissions are never effective.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Returns `category.name`, or just `name` for uncategorized permissions.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.category {
            Some(category) => format!("{}.{}", category.as_str(), self.name.as_str()),
            None => self.name.as_str().to_owned(),
        }
    }

    /// Returns the label for the mirror capability record.
    #[must_use]
    pub fn capability_label(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| self.name.as_str())
    }
}

/// Permission requested by an access check, optionally namespaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRef {
    category: Option<String>,
    name: String,
}

impl PermissionRef {
    /// Parses `name` or `category.name`.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().split_once('.') {
            Some((category, name)) => Ok(Self {
                category: Some(PermissionCategory::new(category)?.0),
                name: PermissionName::new(name)?.0,
            }),
            None => Ok(Self {
                category: None,
                name: PermissionName::new(value)?.0,
            }),
        }
    }

    /// Returns the requested permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the requested category, when namespaced.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns whether a stored permission satisfies this request.
    ///
    /// Bare names match on name alone; namespaced names must match both parts.
    #[must_use]
    pub fn matches(&self, permission: &Permission) -> bool {
        if permission.name.as_str() != self.name {
            return false;
        }

        match &self.category {
            None => true,
            Some(category) => permission
                .category
                .as_ref()
                .is_some_and(|stored| stored.as_str() == category),
        }
    }
}

impl std::fmt::Display for PermissionRef {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.category {
            Some(category) => write!(formatter, "{category}.{}", self.name),
            None => write!(formatter, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn permission(name: &str, category: Option<&str>) -> Permission {
        Permission {
            id: PermissionId::new(),
            name: PermissionName::new(name).unwrap_or_else(|_| panic!("name")),
            description: None,
            category: category
                .map(|value| PermissionCategory::new(value).unwrap_or_else(|_| panic!("category"))),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn permission_name_rejects_dots() {
        assert!(PermissionName::new("project.edit").is_err());
    }

    #[test]
    fn qualified_name_includes_category() {
        assert_eq!(
            permission("project_edit", Some("project")).qualified_name(),
            "project.project_edit"
        );
        assert_eq!(permission("project_edit", None).qualified_name(), "project_edit");
    }

    #[test]
    fn bare_reference_matches_any_category() -> AppResult<()> {
        let reference = PermissionRef::parse("project_edit")?;
        assert!(reference.matches(&permission("project_edit", Some("project"))));
        assert!(reference.matches(&permission("project_edit", None)));
        assert!(!reference.matches(&permission("project_view", Some("project"))));
        Ok(())
    }

    #[test]
    fn namespaced_reference_requires_category() -> AppResult<()> {
        let reference = PermissionRef::parse("project.project_edit")?;
        assert!(reference.matches(&permission("project_edit", Some("project"))));
        assert!(!reference.matches(&permission("project_edit", Some("report"))));
        assert!(!reference.matches(&permission("project_edit", None)));
        assert_eq!(reference.to_string(), "project.project_edit");
        Ok(())
    }

    #[test]
    fn reference_with_two_dots_is_rejected() {
        assert!(PermissionRef::parse("core.project.edit").is_err());
    }

    #[test]
    fn capability_label_prefers_description() {
        let mut value = permission("report_view", Some("report"));
        assert_eq!(value.capability_label(), "report_view");
        value.description = Some("View reports".to_owned());
        assert_eq!(value.capability_label(), "View reports");
    }
}
