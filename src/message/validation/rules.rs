//! Field predicates over a message's current values.
//!
//! Every rule is a pure function. Export calls them in a fixed order and
//! reports the first one that fails.

use crate::message::{
    domain::{Message, MessageType},
    error::{CREATE_REQUIRED_KEYS, UPDATE_REQUIRED_KEYS, ValidationError},
};

/// Returns `true` unless the message is flagged not-handled without being a
/// user message.
#[must_use]
pub fn validate_not_handled(message: &Message) -> bool {
    !message.not_handled() || message.message_type() == MessageType::User
}

/// Returns `true` unless the message is flagged as feedback without being a
/// user message.
#[must_use]
pub fn validate_feedback(message: &Message) -> bool {
    !message.feedback() || message.message_type() == MessageType::User
}

/// Returns `true` when every field a create request needs is set.
///
/// The type and timestamp always carry a value, so only the optional fields
/// are inspected.
#[must_use]
pub fn validate_create_manifest(message: &Message) -> bool {
    message.api_key().is_some()
        && message.user_id().is_some()
        && message.platform().is_some()
        && message.message().is_some()
}

/// Returns `true` when the API key and message id are both set.
#[must_use]
pub fn validate_update_manifest(message: &Message) -> bool {
    message.api_key().is_some() && message.message_id().is_some()
}

/// Runs the not-handled and feedback rules, in that order.
///
/// # Errors
///
/// Returns [`ValidationError::NotHandledValidation`] or
/// [`ValidationError::FeedbackValidation`] for the first rule that fails.
pub fn ensure_flags_allowed(message: &Message) -> Result<(), ValidationError> {
    if !validate_not_handled(message) {
        return Err(ValidationError::NotHandledValidation);
    }
    if !validate_feedback(message) {
        return Err(ValidationError::FeedbackValidation);
    }
    Ok(())
}

/// Runs every rule a create export depends on.
///
/// # Errors
///
/// Returns the first failing rule's error.
pub fn ensure_create_ready(message: &Message) -> Result<(), ValidationError> {
    ensure_flags_allowed(message)?;
    if !validate_create_manifest(message) {
        return Err(ValidationError::RequiredKeysNotSet(CREATE_REQUIRED_KEYS));
    }
    Ok(())
}

/// Runs every rule an update export depends on.
///
/// # Errors
///
/// Returns the first failing rule's error.
pub fn ensure_update_ready(message: &Message) -> Result<(), ValidationError> {
    ensure_flags_allowed(message)?;
    if !validate_update_manifest(message) {
        return Err(ValidationError::RequiredKeysNotSet(UPDATE_REQUIRED_KEYS));
    }
    Ok(())
}
