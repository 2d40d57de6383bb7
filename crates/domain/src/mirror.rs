//! Records of the coarse-grained group/capability system mirrored from roles.

use serde::{Deserialize, Serialize};

/// Identifier of a mirror group row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegacyGroupId(i64);

impl LegacyGroupId {
    /// Wraps a stored group key.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LegacyGroupId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a mirror capability row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LegacyCapabilityId(i64);

impl LegacyCapabilityId {
    /// Wraps a stored capability key.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Mirror group owned by one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyGroup {
    /// Group key.
    pub id: LegacyGroupId,
    /// Unique group name, `role_<role name>` for mirrored roles.
    pub name: String,
}

/// Mirror capability keyed by permission name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCapability {
    /// Capability key.
    pub id: LegacyCapabilityId,
    /// Unique codename, equal to the permission name.
    pub codename: String,
    /// Human label, taken from the permission description.
    pub name: String,
}
