//! Client configuration loaded with Figment.
//!
//! Merge order, later layers overriding earlier ones:
//! 1. compiled defaults
//! 2. a TOML file (`chatbase.toml` in the working directory, or an explicit
//!    path)
//! 3. `CHATBASE_*` environment variables, e.g. `CHATBASE_CLIENT_TIMEOUT_MS`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default single-message create endpoint.
pub const DEFAULT_CREATE_ENDPOINT: &str = "https://chatbase-area120.appspot.com/api/message";

/// Default group create endpoint.
pub const DEFAULT_CREATE_GROUP_ENDPOINT: &str =
    "https://chatbase-area120.appspot.com/api/messages";

/// Default update endpoint.
pub const DEFAULT_UPDATE_ENDPOINT: &str =
    "https://chatbase-area120.appspot.com/api/message/update";

/// Default request timeout in milliseconds.
pub const DEFAULT_CLIENT_TIMEOUT_MS: u64 = 5000;

const CONFIG_FILE: &str = "chatbase.toml";
const ENV_PREFIX: &str = "CHATBASE_";

/// Endpoints and timeouts used by the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL receiving single create requests.
    pub create_endpoint: String,
    /// URL receiving group create requests.
    pub create_group_endpoint: String,
    /// URL receiving update requests.
    pub update_endpoint: String,
    /// Request timeout in milliseconds.
    pub client_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            create_endpoint: DEFAULT_CREATE_ENDPOINT.to_owned(),
            create_group_endpoint: DEFAULT_CREATE_GROUP_ENDPOINT.to_owned(),
            update_endpoint: DEFAULT_UPDATE_ENDPOINT.to_owned(),
            client_timeout_ms: DEFAULT_CLIENT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }

    /// Points every endpoint at `base_url`, keeping the service's paths.
    ///
    /// Useful for staging deployments and local test servers.
    #[must_use]
    pub fn with_base_url(self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            create_endpoint: format!("{base}/api/message"),
            create_group_endpoint: format!("{base}/api/messages"),
            update_endpoint: format!("{base}/api/message/update"),
            ..self
        }
    }

    /// Checks that every endpoint is an HTTP(S) URL and the timeout is
    /// non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] or
    /// [`ConfigError::ZeroTimeout`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("create_endpoint", &self.create_endpoint),
            ("create_group_endpoint", &self.create_group_endpoint),
            ("update_endpoint", &self.update_endpoint),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidEndpoint {
                    name,
                    value: value.clone(),
                });
            }
        }
        if self.client_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or extracted.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// An endpoint is not an HTTP(S) URL.
    #[error("{name} must be an http:// or https:// URL, got {value:?}")]
    InvalidEndpoint {
        /// Configuration key.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The request timeout is zero.
    #[error("client_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Loads configuration from `chatbase.toml` and the environment.
///
/// # Errors
///
/// Returns [`ConfigError`] when a layer cannot be extracted or the result
/// fails validation.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    extract(base_figment().merge(Toml::file(CONFIG_FILE)).merge(Env::prefixed(ENV_PREFIX)))
}

/// Loads configuration from `path` and the environment.
///
/// # Errors
///
/// Returns [`ConfigError`] when a layer cannot be extracted or the result
/// fails validation.
pub fn load_config_from_path(path: &Path) -> Result<ClientConfig, ConfigError> {
    extract(base_figment().merge(Toml::file(path)).merge(Env::prefixed(ENV_PREFIX)))
}

/// Loads configuration from TOML text only, ignoring the environment.
///
/// # Errors
///
/// Returns [`ConfigError`] when the text cannot be extracted or the result
/// fails validation.
pub fn load_config_from_str(toml_content: &str) -> Result<ClientConfig, ConfigError> {
    extract(base_figment().merge(Toml::string(toml_content)))
}

fn base_figment() -> Figment {
    Figment::new().merge(Serialized::defaults(ClientConfig::default()))
}

fn extract(figment: Figment) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
