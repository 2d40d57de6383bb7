use std::collections::BTreeSet;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use warden_application::{
    DEFAULT_PROTECTED_ROLE_NAMES, DEFAULT_ROLE_NAME, RbacPolicySettings,
};
use warden_core::AppError;

/// Process mode selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Seed,
    Sync,
}

impl ApiCommand {
    pub fn parse(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some("sync") => Ok(Self::Sync),
            Some(other) => Err(AppError::Configuration(format!(
                "unknown command '{other}', expected one of: serve, migrate, seed, sync"
            ))),
        }
    }
}

/// Initial superuser created by `seed` when both variables are set.
#[derive(Debug, Clone)]
pub struct SeedAdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub frontend_url: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub rbac_policy: RbacPolicySettings,
    pub seed_admin: Option<SeedAdminConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::parse(env::args().nth(1).as_deref())?;

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        // Only the HTTP server issues session cookies.
        let session_secret = if command == ApiCommand::Serve {
            let secret = required_env("SESSION_SECRET")?;
            if secret.len() < 32 {
                return Err(AppError::Configuration(
                    "SESSION_SECRET must be at least 32 characters".to_owned(),
                ));
            }
            secret
        } else {
            env::var("SESSION_SECRET").unwrap_or_default()
        };

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let rbac_policy = rbac_policy_settings(
            optional_env("RBAC_DEFAULT_ROLE"),
            optional_env("RBAC_FALLBACK_ROLE"),
            optional_env("RBAC_PROTECTED_ROLES"),
        );

        let seed_admin = match (
            optional_env("WARDEN_ADMIN_USERNAME"),
            optional_env("WARDEN_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(SeedAdminConfig { username, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Configuration(
                    "WARDEN_ADMIN_USERNAME and WARDEN_ADMIN_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            command,
            database_url,
            frontend_url,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            rbac_policy,
            seed_admin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Configuration(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn rbac_policy_settings(
    default_role: Option<String>,
    fallback_role: Option<String>,
    protected_roles: Option<String>,
) -> RbacPolicySettings {
    let default_role_name = default_role.unwrap_or_else(|| DEFAULT_ROLE_NAME.to_owned());
    let fallback_role_name = fallback_role.unwrap_or_else(|| default_role_name.clone());

    let protected_role_names: BTreeSet<String> = match protected_roles {
        Some(value) => value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        None => DEFAULT_PROTECTED_ROLE_NAMES
            .iter()
            .map(|name| (*name).to_owned())
            .collect(),
    };

    RbacPolicySettings {
        default_role_name,
        fallback_role_name,
        protected_role_names,
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Configuration(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Configuration(format!("{name} must not be empty")));
    }

    Ok(value)
}
