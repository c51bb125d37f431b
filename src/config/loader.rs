//! Load dispatcher configuration from environment variables.

use crate::config::types::RegionHint;
use crate::error::ConfigError;

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Credentials that enable the studio shortcut. Both must be non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudioCredentials {
    pub username: String,
    pub password: String,
}

/// Settings for the external data source adapter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalConfig {
    /// `EXTERNAL_DB_TYPE`, passed through to the adapter as-is.
    pub db_type: Option<String>,
    /// `OUTERBASE_API_KEY`; empty when unset.
    pub api_key: String,
}

/// Everything the dispatcher and its collaborators read from the environment.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub authorization_token: String,
    pub region: RegionHint,
    /// `None` disables the studio shortcut.
    pub studio: Option<StudioCredentials>,
    pub external: ExternalConfig,
    pub max_body_bytes: usize,
}

impl DispatchConfig {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let authorization_token = get("AUTHORIZATION_TOKEN").ok_or(ConfigError::Missing("AUTHORIZATION_TOKEN"))?;

        let region = match get("REGION") {
            Some(raw) => raw.parse::<RegionHint>().map_err(|reason| ConfigError::Invalid {
                key: "REGION",
                value: raw.clone(),
                reason,
            })?,
            None => RegionHint::Auto,
        };

        let studio = match (get("STUDIO_USER"), get("STUDIO_PASS")) {
            (Some(username), Some(password)) => Some(StudioCredentials { username, password }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("only one of STUDIO_USER / STUDIO_PASS is set; studio is disabled");
                None
            }
            (None, None) => None,
        };

        let external = ExternalConfig {
            db_type: get("EXTERNAL_DB_TYPE"),
            api_key: get("OUTERBASE_API_KEY").unwrap_or_default(),
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "MAX_BODY_BYTES",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(DispatchConfig {
            authorization_token,
            region,
            studio,
            external,
            max_body_bytes,
        })
    }
}
