//! Client configuration management.
//!
//! This module handles loading and saving the client configuration,
//! which covers the GraphQL endpoint and HTTP behavior knobs. The
//! persisted auth token lives in its own file managed by
//! [`crate::auth::TokenStore`], not here.
//!
//! Configuration is stored at `~/.config/stayfinder/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "stayfinder";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default GraphQL endpoint
const DEFAULT_ENDPOINT: &str = "https://lostapi.frontendlabs.co.uk/graphql";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// GraphQL endpoint all requests are POSTed to
    pub endpoint: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Also send the token as `x-access-token` alongside the standard
    /// `Authorization` header. Some deployments of the backend only read
    /// the non-standard header.
    pub send_access_token_header: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            send_access_token_header: true,
        }
    }
}

impl ClientConfig {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory where the persisted session token lives
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_compat_header_enabled() {
        let config = ClientConfig::default();
        assert!(config.send_access_token_header);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.endpoint.starts_with("https://"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ClientConfig {
            endpoint: "https://example.test/graphql".to_string(),
            request_timeout_secs: 10,
            send_access_token_header: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.endpoint, config.endpoint);
        assert_eq!(parsed.request_timeout_secs, 10);
        assert!(!parsed.send_access_token_header);
    }
}
