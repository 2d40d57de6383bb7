//! Grant rows linking users to roles and roles to permissions.
//!
//! A grant counts toward access decisions only while it is *effective*: the
//! row is active, the entities on both ends are active and, for user→role
//! grants, the optional expiry lies strictly in the future. An expired grant
//! behaves exactly like an absent one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::UserId;

use crate::{PermissionId, RoleId};

/// Stable grant row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantId(Uuid);

impl GrantId {
    /// Creates a random grant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a grant identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GrantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GrantId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// User→role grant, unique per (user, role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleGrant {
    /// Grant row identifier.
    pub id: GrantId,
    /// Grantee.
    pub user_id: UserId,
    /// Granted role.
    pub role_id: RoleId,
    /// Granting user; cleared when that account is deleted.
    pub assigned_by: Option<UserId>,
    /// Timestamp of the latest assignment or reactivation.
    pub assigned_at: DateTime<Utc>,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft-revocation flag.
    pub is_active: bool,
}

impl UserRoleGrant {
    /// Returns whether the grant's validity window has closed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Returns whether the grant counts toward access decisions at `now`.
    #[must_use]
    pub fn is_effective(&self, now: DateTime<Utc>, user_is_active: bool, role_is_active: bool) -> bool {
        self.is_active && user_is_active && role_is_active && !self.is_expired(now)
    }
}

/// Role→permission grant, unique per (role, permission).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGrant {
    /// Grant row identifier.
    pub id: GrantId,
    /// Grantee role.
    pub role_id: RoleId,
    /// Granted permission.
    pub permission_id: PermissionId,
    /// Granting user; cleared when that account is deleted.
    pub granted_by: Option<UserId>,
    /// Timestamp of the latest grant or reactivation.
    pub granted_at: DateTime<Utc>,
    /// Soft-revocation flag.
    pub is_active: bool,
}

impl RolePermissionGrant {
    /// Returns whether the grant counts toward access decisions.
    #[must_use]
    pub fn is_effective(&self, permission_is_active: bool) -> bool {
        self.is_active && permission_is_active
    }
}
