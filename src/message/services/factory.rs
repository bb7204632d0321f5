//! Builds messages and groups from shared defaults.

use crate::message::domain::{Message, MessageBinding, MessageDefaults, MessageGroup};
use mockable::Clock;
use std::sync::Arc;

/// Produces standalone messages and groups preloaded with defaults.
///
/// Defaults are applied as initial values, so they never mark a field for
/// update.
#[derive(Debug, Clone)]
pub struct MessageFactory<C>
where
    C: Clock + Send + Sync,
{
    defaults: MessageDefaults,
    clock: Arc<C>,
}

impl<C> MessageFactory<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a factory stamping messages with `clock`.
    #[must_use]
    pub const fn new(defaults: MessageDefaults, clock: Arc<C>) -> Self {
        Self { defaults, clock }
    }

    /// Returns the defaults applied to new messages.
    #[must_use]
    pub const fn defaults(&self) -> &MessageDefaults {
        &self.defaults
    }

    /// Replaces the defaults used for messages built from now on.
    pub fn set_defaults(&mut self, defaults: MessageDefaults) -> &mut Self {
        self.defaults = defaults;
        self
    }

    /// Builds a standalone message from the defaults.
    #[must_use]
    pub fn new_message(&self) -> Message {
        Message::from_defaults(
            &self.defaults,
            None,
            None,
            MessageBinding::Standalone,
            &*self.clock,
        )
    }

    /// Builds a standalone message with its own credentials.
    ///
    /// An empty API key or user id falls back to the default.
    #[must_use]
    pub fn new_message_for(&self, api_key: &str, user_id: &str) -> Message {
        Message::from_defaults(
            &self.defaults,
            non_empty(api_key),
            non_empty(user_id),
            MessageBinding::Standalone,
            &*self.clock,
        )
    }

    /// Builds an empty group sharing a snapshot of the defaults.
    #[must_use]
    pub fn new_group(&self) -> MessageGroup {
        MessageGroup::new(self.defaults.clone())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}
