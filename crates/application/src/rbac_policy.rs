//! Default, fallback and protected role configuration.

use std::collections::BTreeSet;

use tracing::{info, warn};
use warden_core::AppResult;
use warden_domain::RoleId;

use crate::RoleRepository;

/// Role assigned to new users when none is requested.
pub const DEFAULT_ROLE_NAME: &str = "Basic User";

/// Role names that can never be deleted.
pub const DEFAULT_PROTECTED_ROLE_NAMES: [&str; 2] = ["System Administrator", "Basic User"];

/// Role policy as configured, before lookup against the role store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbacPolicySettings {
    /// Role given to new users without an explicit role.
    pub default_role_name: String,
    /// Role receiving holders of a deleted role.
    pub fallback_role_name: String,
    /// Role names that cannot be deleted.
    pub protected_role_names: BTreeSet<String>,
}

impl Default for RbacPolicySettings {
    fn default() -> Self {
        Self {
            default_role_name: DEFAULT_ROLE_NAME.to_owned(),
            fallback_role_name: DEFAULT_ROLE_NAME.to_owned(),
            protected_role_names: DEFAULT_PROTECTED_ROLE_NAMES
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
        }
    }
}

impl RbacPolicySettings {
    /// Looks the configured role names up once.
    ///
    /// Missing roles are logged, not fatal: seeding may run after startup.
    pub async fn resolve(self, roles: &dyn RoleRepository) -> AppResult<RbacPolicy> {
        let default_role = roles
            .find_role_by_name(&self.default_role_name)
            .await?
            .map(|role| role.id);
        let fallback_role = roles
            .find_role_by_name(&self.fallback_role_name)
            .await?
            .map(|role| role.id);

        if default_role.is_none() {
            warn!(role = self.default_role_name.as_str(), "default role does not exist yet");
        }
        if fallback_role.is_none() {
            warn!(role = self.fallback_role_name.as_str(), "fallback role does not exist yet");
        }

        info!(
            default_role = self.default_role_name.as_str(),
            fallback_role = self.fallback_role_name.as_str(),
            protected = self.protected_role_names.len(),
            "rbac policy resolved"
        );

        Ok(RbacPolicy {
            settings: self,
            default_role,
            fallback_role,
        })
    }
}

/// Role policy with role identifiers resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbacPolicy {
    settings: RbacPolicySettings,
    default_role: Option<RoleId>,
    fallback_role: Option<RoleId>,
}

impl RbacPolicy {
    /// Builds a policy from already known identifiers.
    #[must_use]
    pub fn new(
        settings: RbacPolicySettings,
        default_role: Option<RoleId>,
        fallback_role: Option<RoleId>,
    ) -> Self {
        Self {
            settings,
            default_role,
            fallback_role,
        }
    }

    /// Returns whether the named role is protected from deletion.
    #[must_use]
    pub fn is_protected(&self, role_name: &str) -> bool {
        self.settings.protected_role_names.contains(role_name)
    }

    /// Returns the configured default role name.
    #[must_use]
    pub fn default_role_name(&self) -> &str {
        self.settings.default_role_name.as_str()
    }

    /// Returns the configured fallback role name.
    #[must_use]
    pub fn fallback_role_name(&self) -> &str {
        self.settings.fallback_role_name.as_str()
    }

    /// Returns the default role resolved at startup.
    #[must_use]
    pub fn default_role(&self) -> Option<RoleId> {
        self.default_role
    }

    /// Returns the fallback role resolved at startup.
    #[must_use]
    pub fn fallback_role(&self) -> Option<RoleId> {
        self.fallback_role
    }
}
