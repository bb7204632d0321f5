//! The message aggregate: field values, lifecycle state and payload export.

use super::{
    CreatePayload, LifecycleState, MessageDefaults, TrueFlag, UpdateBlock, UpdateField,
    UpdatePayload,
};
use crate::message::{
    error::{CREATE_REQUIRED_KEYS, UPDATE_REQUIRED_KEYS, ValidationError},
    validation::rules,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Who authored a logged message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// A message sent by the end user.
    #[default]
    User,
    /// A message sent by the bot.
    Agent,
}

impl MessageType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageType {
    type Error = ParseMessageTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            _ => Err(ParseMessageTypeError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a message type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown message type: {0}")]
pub struct ParseMessageTypeError(pub String);

/// Whether a message is sent on its own or as part of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MessageBinding {
    /// Sent and updated individually.
    #[default]
    Standalone,
    /// Created through its group only; never individually sent or updated.
    Grouped,
}

/// One logged interaction.
///
/// Setters are fluent and never validate. Validation happens when a payload
/// is exported, which is also what the service does before every request.
///
/// Setting `intent`, `not_handled`, `version` or `feedback` after create has
/// completed (and while no failure blocks updates) marks that field for the
/// next update request. Setting them at any other time only changes the local
/// value.
///
/// # Examples
///
/// ```
/// use chatbase_client::message::domain::Message;
/// use mockable::DefaultClock;
///
/// let mut message = Message::with_credentials("key", "user-7", &DefaultClock);
/// message.set_platform("web").set_message("where is my order?");
///
/// let payload = message.export_create_payload().expect("all required fields set");
/// assert_eq!(payload.platform, "web");
/// assert_eq!(payload.intent, None);
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    api_key: Option<String>,
    user_id: Option<String>,
    message_type: MessageType,
    time_stamp: String,
    platform: Option<String>,
    message: Option<String>,
    intent: Option<String>,
    not_handled: bool,
    feedback: bool,
    version: Option<String>,
    message_id: Option<String>,
    response_time: Option<f64>,
    custom_session_id: Option<String>,
    client_timeout: Duration,
    binding: MessageBinding,
    lifecycle: LifecycleState,
}

impl Message {
    /// Creates an empty standalone message stamped with the current time.
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            api_key: None,
            user_id: None,
            message_type: MessageType::User,
            time_stamp: clock.utc().timestamp_millis().to_string(),
            platform: None,
            message: None,
            intent: None,
            not_handled: false,
            feedback: false,
            version: None,
            message_id: None,
            response_time: None,
            custom_session_id: None,
            client_timeout: super::DEFAULT_CLIENT_TIMEOUT,
            binding: MessageBinding::Standalone,
            lifecycle: LifecycleState::new(),
        }
    }

    /// Creates a standalone message with its API key and user id.
    #[must_use]
    pub fn with_credentials(
        api_key: impl Into<String>,
        user_id: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let mut message = Self::new(clock);
        message.api_key = Some(api_key.into());
        message.user_id = Some(user_id.into());
        message
    }

    /// Builds a message from shared defaults without touching dirty flags.
    pub(crate) fn from_defaults(
        defaults: &MessageDefaults,
        api_key: Option<String>,
        user_id: Option<String>,
        binding: MessageBinding,
        clock: &impl Clock,
    ) -> Self {
        Self {
            api_key: api_key.or_else(|| defaults.api_key().map(str::to_owned)),
            user_id: user_id.or_else(|| defaults.user_id().map(str::to_owned)),
            message_type: defaults.message_type().unwrap_or_default(),
            platform: defaults.platform().map(str::to_owned),
            intent: defaults.intent().map(str::to_owned),
            version: defaults.version().map(str::to_owned),
            custom_session_id: defaults.custom_session_id().map(str::to_owned),
            client_timeout: defaults.client_timeout(),
            binding,
            ..Self::new(clock)
        }
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    /// Sets the API key.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the end-user id.
    pub fn set_user_id(&mut self, user_id: impl Into<String>) -> &mut Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Marks the message as sent by the user.
    pub const fn set_as_type_user(&mut self) -> &mut Self {
        self.message_type = MessageType::User;
        self
    }

    /// Marks the message as sent by the agent.
    pub const fn set_as_type_agent(&mut self) -> &mut Self {
        self.message_type = MessageType::Agent;
        self
    }

    /// Overrides the creation timestamp (milliseconds since the Unix epoch).
    pub fn set_timestamp(&mut self, time_stamp: impl Into<String>) -> &mut Self {
        self.time_stamp = time_stamp.into();
        self
    }

    /// Sets the originating platform.
    pub fn set_platform(&mut self, platform: impl Into<String>) -> &mut Self {
        self.platform = Some(platform.into());
        self
    }

    /// Sets the message body.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the dialog intent.
    pub fn set_intent(&mut self, intent: impl Into<String>) -> &mut Self {
        self.flag_if_updatable(UpdateField::Intent);
        self.intent = Some(intent.into());
        self
    }

    /// Marks the message as handled by the agent.
    pub fn set_as_handled(&mut self) -> &mut Self {
        self.flag_if_updatable(UpdateField::NotHandled);
        self.not_handled = false;
        self
    }

    /// Marks the message as not handled by the agent.
    pub fn set_as_not_handled(&mut self) -> &mut Self {
        self.flag_if_updatable(UpdateField::NotHandled);
        self.not_handled = true;
        self
    }

    /// Sets the bot version.
    pub fn set_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.flag_if_updatable(UpdateField::Version);
        self.version = Some(version.into());
        self
    }

    /// Marks the message as user feedback.
    pub fn set_as_feedback(&mut self) -> &mut Self {
        self.flag_if_updatable(UpdateField::Feedback);
        self.feedback = true;
        self
    }

    /// Clears the feedback marker.
    pub fn set_as_not_feedback(&mut self) -> &mut Self {
        self.flag_if_updatable(UpdateField::Feedback);
        self.feedback = false;
        self
    }

    /// Sets the service-assigned message id.
    pub fn set_message_id(&mut self, message_id: impl Into<String>) -> &mut Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Sets the agent response time.
    pub const fn set_response_time(&mut self, response_time: f64) -> &mut Self {
        self.response_time = Some(response_time);
        self
    }

    /// Sets the custom session id.
    pub fn set_custom_session_id(&mut self, custom_session_id: impl Into<String>) -> &mut Self {
        self.custom_session_id = Some(custom_session_id.into());
        self
    }

    /// Sets the timeout handed to the transport for this message's requests.
    pub const fn set_client_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.client_timeout = timeout;
        self
    }

    fn flag_if_updatable(&mut self, field: UpdateField) {
        if self.lifecycle.create_completed() && !self.lifecycle.cannot_be_updated().is_blocked() {
            self.lifecycle.flag_field_for_update(field);
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the end-user id.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the message type.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn time_stamp(&self) -> &str {
        &self.time_stamp
    }

    /// Returns the originating platform.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Returns the message body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the dialog intent.
    #[must_use]
    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    /// Returns whether the message is marked as not handled.
    #[must_use]
    pub const fn not_handled(&self) -> bool {
        self.not_handled
    }

    /// Returns whether the message is marked as feedback.
    #[must_use]
    pub const fn feedback(&self) -> bool {
        self.feedback
    }

    /// Returns the bot version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the service-assigned message id.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Returns the agent response time.
    #[must_use]
    pub const fn response_time(&self) -> Option<f64> {
        self.response_time
    }

    /// Returns the custom session id.
    #[must_use]
    pub fn custom_session_id(&self) -> Option<&str> {
        self.custom_session_id.as_deref()
    }

    /// Returns the transport timeout for this message.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        self.client_timeout
    }

    /// Returns how the message is sent.
    #[must_use]
    pub const fn binding(&self) -> MessageBinding {
        self.binding
    }

    /// Returns `true` if the message belongs to a group.
    #[must_use]
    pub const fn is_grouped(&self) -> bool {
        matches!(self.binding, MessageBinding::Grouped)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    pub(crate) const fn lifecycle_mut(&mut self) -> &mut LifecycleState {
        &mut self.lifecycle
    }

    /// Returns whether a create request was started.
    #[must_use]
    pub const fn create_entry_started(&self) -> bool {
        self.lifecycle.create_started()
    }

    /// Returns whether create completed successfully.
    #[must_use]
    pub const fn create_entry_completed(&self) -> bool {
        self.lifecycle.create_completed()
    }

    /// Returns whether an update request was started.
    #[must_use]
    pub const fn update_entry_started(&self) -> bool {
        self.lifecycle.update_started()
    }

    /// Returns whether update completed successfully.
    #[must_use]
    pub const fn update_entry_completed(&self) -> bool {
        self.lifecycle.update_completed()
    }

    /// Returns the raw create response body.
    #[must_use]
    pub const fn create_response(&self) -> Option<&Value> {
        self.lifecycle.create_response()
    }

    /// Returns the raw update response body.
    #[must_use]
    pub const fn update_response(&self) -> Option<&Value> {
        self.lifecycle.update_response()
    }

    /// Reports whether a recorded failure blocks updates.
    #[must_use]
    pub const fn cannot_be_updated(&self) -> UpdateBlock<'_> {
        self.lifecycle.cannot_be_updated()
    }

    pub(crate) fn assign_message_id(&mut self, message_id: Option<String>) {
        self.message_id = message_id;
    }

    // ------------------------------------------------------------------
    // Payload export
    // ------------------------------------------------------------------

    /// Exports the create request payload.
    ///
    /// # Errors
    ///
    /// Checks run in order and the first failure is returned:
    /// [`ValidationError::NotHandledValidation`],
    /// [`ValidationError::FeedbackValidation`], then
    /// [`ValidationError::RequiredKeysNotSet`].
    pub fn export_create_payload(&self) -> Result<CreatePayload, ValidationError> {
        rules::ensure_create_ready(self)?;
        let (Some(api_key), Some(user_id), Some(platform), Some(message)) = (
            self.api_key.as_ref(),
            self.user_id.as_ref(),
            self.platform.as_ref(),
            self.message.as_ref(),
        ) else {
            return Err(ValidationError::RequiredKeysNotSet(CREATE_REQUIRED_KEYS));
        };

        Ok(CreatePayload {
            api_key: api_key.clone(),
            user_id: user_id.clone(),
            message_type: self.message_type,
            time_stamp: self.time_stamp.clone(),
            platform: platform.clone(),
            message: message.clone(),
            intent: self.intent.clone(),
            version: self.version.clone(),
            response_time: self.response_time,
            custom_session_id: self.custom_session_id.clone(),
            not_handled: TrueFlag::from_bool(self.not_handled),
            feedback: TrueFlag::from_bool(self.feedback),
        })
    }

    /// Exports the update request payload.
    ///
    /// # Errors
    ///
    /// Checks run in order and the first failure is returned:
    /// [`ValidationError::NotHandledValidation`],
    /// [`ValidationError::FeedbackValidation`], then
    /// [`ValidationError::RequiredKeysNotSet`].
    pub fn export_update_payload(&self) -> Result<UpdatePayload, ValidationError> {
        rules::ensure_update_ready(self)?;
        let (Some(api_key), Some(message_id)) = (self.api_key.as_ref(), self.message_id.as_ref())
        else {
            return Err(ValidationError::RequiredKeysNotSet(UPDATE_REQUIRED_KEYS));
        };

        Ok(UpdatePayload {
            api_key: api_key.clone(),
            message_id: message_id.clone(),
            intent: self.intent.clone(),
            version: self.version.clone(),
            not_handled: self.not_handled,
            feedback: self.feedback,
        })
    }
}
