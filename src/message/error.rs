//! Error types for payload export, lifecycle transitions and service
//! responses.
//!
//! Uses `thiserror` for typed variants that callers can match on. Every
//! rejection returned by [`crate::message::services::MessageService`] is a
//! [`MessageError`], whether it was raised locally, by a response-shape check
//! or by the transport.

use super::{domain::PartitionedResponses, ports::TransportError};
use serde_json::Value;
use thiserror::Error;

/// Fields that must be present before a create payload can be exported.
pub const CREATE_REQUIRED_KEYS: &[&str] = &[
    "api_key",
    "type",
    "user_id",
    "time_stamp",
    "platform",
    "message",
];

/// Fields that must be present before an update payload can be exported.
pub const UPDATE_REQUIRED_KEYS: &[&str] = &["api_key", "message_id"];

/// Errors raised while exporting a message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `not_handled` is set on a message whose type is not `user`.
    #[error("the message cannot be set as not_handled and not be of type user")]
    NotHandledValidation,

    /// `feedback` is set on a message whose type is not `user`.
    #[error("the message cannot have feedback set if it is not of type user")]
    FeedbackValidation,

    /// One or more required fields are missing.
    #[error(
        "one or more required fields were not set on the message, check the following fields: {}",
        .0.join(", ")
    )]
    RequiredKeysNotSet(&'static [&'static str]),
}

/// Broad classification of a [`MessageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Raised before any network call: validation or call ordering.
    Local,
    /// The transport succeeded but the response failed a contract check.
    ResponseShape,
    /// Network or HTTP-level failure.
    Transport,
}

/// Errors returned by message create, update and group create operations.
#[derive(Debug, Clone, Error)]
pub enum MessageError {
    /// The payload could not be exported.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A create request was already started for this message.
    #[error("this message has already been sent")]
    AlreadySent,

    /// A prior create or update failure blocks further updates.
    #[error("this message cannot be updated due to a prior error")]
    CannotBeUpdated,

    /// Update was requested before create completed.
    #[error("the message cannot be updated before it is first sent to the service")]
    MustBeSentFirst,

    /// An update request was already started for this message.
    #[error("this message has already been updated")]
    AlreadyUpdated,

    /// The create response carried no body.
    #[error("the service returned an empty response when creating the entry")]
    EmptyCreateResponse,

    /// The create response body status was not 200.
    #[error("the service returned a create response with an empty or bad status: {0}")]
    BadStatusCreateResponse(Value),

    /// The create response did not carry a usable message id.
    #[error("the service returned a response with an empty or invalid message id")]
    BadMessageIdCreateResponse,

    /// The update response carried no body.
    #[error("the service returned an empty response when updating the entry")]
    EmptyUpdateResponse,

    /// The service reported specific fields that failed to update.
    #[error("the service reported that specific fields failed to update: {}", .0.join(", "))]
    FieldsFailedToUpdate(Vec<String>),

    /// The service reported a free-form update error.
    #[error("the service returned an error on update: {0}")]
    GenericUpdateError(String),

    /// The update response body status was not 200.
    #[error("the service returned an update response with an empty or bad status: {0}")]
    BadStatusUpdateResponse(Value),

    /// The update response succeeded without listing the updated fields.
    #[error("the service responded without an \"updated\" field; some fields may not have updated")]
    UpdateResponseDidNotHaveUpdatedList,

    /// The group create request was already started.
    #[error("the message group has already been sent for creation")]
    GroupAlreadySent,

    /// Some messages in a group failed to be created.
    #[error(
        "the service reported a partial failure for the message group: {} of {} messages failed",
        .0.failed().len(),
        .0.len()
    )]
    PartialPayloadFailure(PartitionedResponses),

    /// Group members can only be sent through their group.
    #[error("a message belonging to a group cannot be sent individually")]
    CannotSendIndividualMessage,

    /// Group members cannot be updated.
    #[error("a message belonging to a group cannot be updated individually")]
    CannotUpdateIndividualMessage,

    /// The transport failed before a response could be validated.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl MessageError {
    /// Returns the broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::AlreadySent
            | Self::CannotBeUpdated
            | Self::MustBeSentFirst
            | Self::AlreadyUpdated
            | Self::GroupAlreadySent
            | Self::CannotSendIndividualMessage
            | Self::CannotUpdateIndividualMessage => ErrorKind::Local,
            Self::EmptyCreateResponse
            | Self::BadStatusCreateResponse(_)
            | Self::BadMessageIdCreateResponse
            | Self::EmptyUpdateResponse
            | Self::FieldsFailedToUpdate(_)
            | Self::GenericUpdateError(_)
            | Self::BadStatusUpdateResponse(_)
            | Self::UpdateResponseDidNotHaveUpdatedList
            | Self::PartialPayloadFailure(_) => ErrorKind::ResponseShape,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Returns `true` for errors raised before any request was issued.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.kind(), ErrorKind::Local)
    }

    /// Returns `true` for responses that failed a contract check.
    #[must_use]
    pub const fn is_response_shape(&self) -> bool {
        matches!(self.kind(), ErrorKind::ResponseShape)
    }

    /// Returns `true` for network and HTTP-level failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport)
    }

    /// Returns the partitioned group responses for a partial failure.
    #[must_use]
    pub const fn partitioned_responses(&self) -> Option<&PartitionedResponses> {
        match self {
            Self::PartialPayloadFailure(responses) => Some(responses),
            _ => None,
        }
    }
}

/// Result type for message service operations.
pub type MessageResult<T> = Result<T, MessageError>;
