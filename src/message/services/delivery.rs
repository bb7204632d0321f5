//! Create, update and group create flows.

use crate::message::{
    domain::{LifecycleFailure, LifecycleState, Message, MessageGroup, ServiceResponse},
    error::{MessageError, MessageResult},
    ports::MessageTransport,
    validation::{
        extract_message_id, validate_create_response, validate_group_response,
        validate_update_response,
    },
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives messages and groups through their create and update lifecycle.
///
/// Each operation checks the lifecycle, exports the payload, marks the
/// request as started, calls the transport exactly once and then records the
/// validated outcome. Nothing is retried; a failed create or update blocks
/// every later update of that message.
#[derive(Clone)]
pub struct MessageService<T>
where
    T: MessageTransport,
{
    transport: Arc<T>,
}

impl<T> MessageService<T>
where
    T: MessageTransport,
{
    /// Creates a service issuing requests through `transport`.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Creates `message` with the service and stores the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::CannotSendIndividualMessage`] for group
    /// members, [`MessageError::AlreadySent`] when create was already
    /// started and [`MessageError::Validation`] when the payload cannot be
    /// exported. None of these touch the lifecycle. Transport failures and
    /// rejected responses are recorded as create failures and returned.
    pub async fn send<'m>(&self, message: &'m mut Message) -> MessageResult<&'m mut Message> {
        if message.is_grouped() {
            return Err(MessageError::CannotSendIndividualMessage);
        }
        if message.create_entry_started() {
            return Err(MessageError::AlreadySent);
        }
        let payload = message.export_create_payload()?;

        message.lifecycle_mut().mark_create_started();
        debug!(user_id = %payload.user_id, "sending message create request");
        let outcome = self
            .transport
            .create_message(&payload, message.client_timeout())
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Err(fail_create(message.lifecycle_mut(), err.into(), None)),
        };
        if let Err(err) = validate_create_response(&response) {
            return Err(fail_create(message.lifecycle_mut(), err, Some(response)));
        }

        let message_id = extract_message_id(response.body());
        let body = response.into_body().unwrap_or_default();
        message.lifecycle_mut().mark_create_completed(body);
        message.assign_message_id(message_id);
        info!(message_id = ?message.message_id(), "message created");
        Ok(message)
    }

    /// Sends the fields changed since creation.
    ///
    /// Only fields flagged in the options manifest are included in the
    /// request body.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::CannotUpdateIndividualMessage`] for group
    /// members, then [`MessageError::CannotBeUpdated`],
    /// [`MessageError::MustBeSentFirst`] and [`MessageError::AlreadyUpdated`]
    /// in that order of precedence, and [`MessageError::Validation`] when the
    /// payload cannot be exported. Transport failures and rejected responses
    /// are recorded as update failures and returned.
    pub async fn update<'m>(&self, message: &'m mut Message) -> MessageResult<&'m mut Message> {
        if message.is_grouped() {
            return Err(MessageError::CannotUpdateIndividualMessage);
        }
        if message.cannot_be_updated().is_blocked() {
            return Err(MessageError::CannotBeUpdated);
        }
        if !message.create_entry_completed() {
            return Err(MessageError::MustBeSentFirst);
        }
        if message.update_entry_started() {
            return Err(MessageError::AlreadyUpdated);
        }
        let payload = message.export_update_payload()?;
        let (query, body) = payload.split(&message.lifecycle().options_manifest());

        message.lifecycle_mut().mark_update_started();
        debug!(message_id = %query.message_id, "sending message update request");
        let outcome = self
            .transport
            .update_message(&query, &body, message.client_timeout())
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Err(fail_update(message.lifecycle_mut(), err.into(), None)),
        };
        if let Err(err) = validate_update_response(&response) {
            return Err(fail_update(message.lifecycle_mut(), err, Some(response)));
        }

        let response_body = response.into_body().unwrap_or_default();
        message.lifecycle_mut().mark_update_completed(response_body);
        info!(message_id = %query.message_id, "message updated");
        Ok(message)
    }

    /// Creates every member of `group` with a single request.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::GroupAlreadySent`] when the group create was
    /// already started and the first member export error otherwise, without
    /// touching the lifecycle. Transport failures and rejected responses,
    /// including [`MessageError::PartialPayloadFailure`], are recorded as
    /// group create failures and returned.
    pub async fn send_group<'g>(
        &self,
        group: &'g mut MessageGroup,
    ) -> MessageResult<&'g mut MessageGroup> {
        if group.create_entry_started() {
            return Err(MessageError::GroupAlreadySent);
        }
        let payload = group.export_create_payload()?;

        group.lifecycle_mut().mark_create_started();
        debug!(messages = payload.messages.len(), "sending group create request");
        let outcome = self
            .transport
            .create_message_group(&payload, group.client_timeout())
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Err(fail_create(group.lifecycle_mut(), err.into(), None)),
        };
        if let Err(err) = validate_group_response(&response) {
            return Err(fail_create(group.lifecycle_mut(), err, Some(response)));
        }

        let body = response.into_body().unwrap_or_default();
        group.lifecycle_mut().mark_create_completed(body);
        info!(messages = group.len(), "message group created");
        Ok(group)
    }
}

fn fail_create(
    lifecycle: &mut LifecycleState,
    error: MessageError,
    response: Option<ServiceResponse>,
) -> MessageError {
    warn!(error = %error, "create request failed");
    lifecycle.mark_create_errored(LifecycleFailure::new(error.clone(), response));
    error
}

fn fail_update(
    lifecycle: &mut LifecycleState,
    error: MessageError,
    response: Option<ServiceResponse>,
) -> MessageError {
    warn!(error = %error, "update request failed");
    lifecycle.mark_update_errored(LifecycleFailure::new(error.clone(), response));
    error
}
