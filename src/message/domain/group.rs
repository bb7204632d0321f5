//! Groups of messages created in a single request.

use super::{GroupCreatePayload, LifecycleState, Message, MessageBinding, MessageDefaults};
use crate::message::error::ValidationError;
use mockable::Clock;
use serde_json::Value;
use std::time::Duration;

/// An ordered set of messages sent to the group create endpoint together.
///
/// Members are built from the group's defaults and are bound to the group:
/// they cannot be sent or updated on their own. Only the create side of the
/// group's lifecycle is ever used.
#[derive(Debug, Clone)]
pub struct MessageGroup {
    defaults: MessageDefaults,
    messages: Vec<Message>,
    lifecycle: LifecycleState,
    client_timeout: Duration,
}

impl Default for MessageGroup {
    fn default() -> Self {
        Self::new(MessageDefaults::default())
    }
}

impl MessageGroup {
    /// Creates an empty group whose members start from `defaults`.
    #[must_use]
    pub fn new(defaults: MessageDefaults) -> Self {
        let client_timeout = defaults.client_timeout();
        Self {
            defaults,
            messages: Vec::new(),
            lifecycle: LifecycleState::new(),
            client_timeout,
        }
    }

    /// Adds a member built from the group defaults and returns it.
    pub fn add_message(&mut self, clock: &impl Clock) -> &mut Message {
        self.push_member(None, None, clock)
    }

    /// Adds a member with its own credentials and returns it.
    ///
    /// Empty overrides fall back to the group defaults.
    pub fn add_message_for(
        &mut self,
        api_key: impl Into<String>,
        user_id: impl Into<String>,
        clock: &impl Clock,
    ) -> &mut Message {
        self.push_member(non_empty(api_key.into()), non_empty(user_id.into()), clock)
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "the index refers to the element pushed on the previous line"
    )]
    fn push_member(
        &mut self,
        api_key: Option<String>,
        user_id: Option<String>,
        clock: &impl Clock,
    ) -> &mut Message {
        let message = Message::from_defaults(
            &self.defaults,
            api_key,
            user_id,
            MessageBinding::Grouped,
            clock,
        );
        let index = self.messages.len();
        self.messages.push(message);
        &mut self.messages[index]
    }

    /// Returns the defaults members are built from.
    #[must_use]
    pub const fn defaults(&self) -> &MessageDefaults {
        &self.defaults
    }

    /// Returns the members in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the members for in-place edits.
    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sets the timeout handed to the transport for the group request.
    pub const fn set_client_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.client_timeout = timeout;
        self
    }

    /// Returns the group request timeout.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        self.client_timeout
    }

    /// Exports every member's create payload.
    ///
    /// # Errors
    ///
    /// Returns the first member export error, in insertion order.
    pub fn export_create_payload(&self) -> Result<GroupCreatePayload, ValidationError> {
        let messages = self
            .messages
            .iter()
            .map(Message::export_create_payload)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GroupCreatePayload { messages })
    }

    /// Returns the group lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    pub(crate) const fn lifecycle_mut(&mut self) -> &mut LifecycleState {
        &mut self.lifecycle
    }

    /// Returns whether the group create request was started.
    #[must_use]
    pub const fn create_entry_started(&self) -> bool {
        self.lifecycle.create_started()
    }

    /// Returns whether the group create request completed.
    #[must_use]
    pub const fn create_entry_completed(&self) -> bool {
        self.lifecycle.create_completed()
    }

    /// Returns the raw group create response body.
    #[must_use]
    pub const fn create_response(&self) -> Option<&Value> {
        self.lifecycle.create_response()
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
