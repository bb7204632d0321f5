//! Shared defaults applied to messages produced by a factory or group.

use super::MessageType;
use crate::config::ClientConfig;
use std::time::Duration;

/// Timeout handed to the transport when nothing else is configured.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Immutable field defaults for newly built messages.
///
/// Each `with_*` call returns a new value; the original is left untouched so
/// that a snapshot taken by a group never changes underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefaults {
    api_key: Option<String>,
    user_id: Option<String>,
    platform: Option<String>,
    message_type: Option<MessageType>,
    version: Option<String>,
    intent: Option<String>,
    custom_session_id: Option<String>,
    client_timeout: Duration,
}

impl Default for MessageDefaults {
    fn default() -> Self {
        Self {
            api_key: None,
            user_id: None,
            platform: None,
            message_type: None,
            version: None,
            intent: None,
            custom_session_id: None,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
        }
    }
}

impl MessageDefaults {
    /// Creates defaults with no field values and the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates defaults seeded with the configured client timeout.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new().with_client_timeout(config.client_timeout())
    }

    /// Sets the default API key.
    #[must_use]
    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..self
        }
    }

    /// Sets the default user id.
    #[must_use]
    pub fn with_user_id(self, user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..self
        }
    }

    /// Sets the default platform.
    #[must_use]
    pub fn with_platform(self, platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
            ..self
        }
    }

    /// Sets the default message type.
    #[must_use]
    pub fn with_message_type(self, message_type: MessageType) -> Self {
        Self {
            message_type: Some(message_type),
            ..self
        }
    }

    /// Sets the default bot version.
    #[must_use]
    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..self
        }
    }

    /// Sets the default intent.
    #[must_use]
    pub fn with_intent(self, intent: impl Into<String>) -> Self {
        Self {
            intent: Some(intent.into()),
            ..self
        }
    }

    /// Sets the default custom session id.
    #[must_use]
    pub fn with_custom_session_id(self, custom_session_id: impl Into<String>) -> Self {
        Self {
            custom_session_id: Some(custom_session_id.into()),
            ..self
        }
    }

    /// Sets the default client timeout.
    #[must_use]
    pub fn with_client_timeout(self, client_timeout: Duration) -> Self {
        Self {
            client_timeout,
            ..self
        }
    }

    /// Returns the default API key.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the default user id.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the default platform.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Returns the default message type, if one was configured.
    #[must_use]
    pub const fn message_type(&self) -> Option<MessageType> {
        self.message_type
    }

    /// Returns the default bot version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the default intent.
    #[must_use]
    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    /// Returns the default custom session id.
    #[must_use]
    pub fn custom_session_id(&self) -> Option<&str> {
        self.custom_session_id.as_deref()
    }

    /// Returns the default client timeout.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        self.client_timeout
    }
}
