//! Contract checks over service responses.
//!
//! The service reports its own status inside the JSON body; that is the
//! status inspected here. HTTP-level failures never reach these functions
//! because the transport reports them as errors.

use crate::message::{
    domain::{PartitionedResponses, ServiceResponse, is_truthy},
    error::MessageError,
};
use serde_json::Value;

const OK_STATUS: f64 = 200.0;
const MEMBER_SUCCESS: &str = "success";

/// Validates the response to a single-message create request.
///
/// # Errors
///
/// Returns [`MessageError::EmptyCreateResponse`] when the body is empty (see
/// [`ServiceResponse::has_empty_body`]),
/// [`MessageError::BadStatusCreateResponse`] when the body status is not 200
/// and [`MessageError::BadMessageIdCreateResponse`] when no usable message id
/// was returned.
pub fn validate_create_response(response: &ServiceResponse) -> Result<(), MessageError> {
    let body = non_empty_body(response).ok_or(MessageError::EmptyCreateResponse)?;
    let status = body_status(body);
    if !is_ok_status(&status) {
        return Err(MessageError::BadStatusCreateResponse(status));
    }
    if !body.get("message_id").is_some_and(is_truthy) {
        return Err(MessageError::BadMessageIdCreateResponse);
    }
    Ok(())
}

/// Validates the response to an update request.
///
/// # Errors
///
/// Returns [`MessageError::EmptyUpdateResponse`] when there is no body. For a
/// non-200 body status the `error` field decides the variant: a list gives
/// [`MessageError::FieldsFailedToUpdate`], a string gives
/// [`MessageError::GenericUpdateError`] and anything else gives
/// [`MessageError::BadStatusUpdateResponse`]. A 200 body without an `updated`
/// key gives [`MessageError::UpdateResponseDidNotHaveUpdatedList`].
pub fn validate_update_response(response: &ServiceResponse) -> Result<(), MessageError> {
    let body = non_empty_body(response).ok_or(MessageError::EmptyUpdateResponse)?;
    let status = body_status(body);
    if !is_ok_status(&status) {
        return Err(match body.get("error") {
            Some(Value::Array(fields)) => {
                MessageError::FieldsFailedToUpdate(fields.iter().map(field_name).collect())
            }
            Some(Value::String(reason)) => MessageError::GenericUpdateError(reason.clone()),
            _ => MessageError::BadStatusUpdateResponse(status),
        });
    }
    if body.get("updated").is_none() {
        return Err(MessageError::UpdateResponseDidNotHaveUpdatedList);
    }
    Ok(())
}

/// Validates the response to a group create request.
///
/// # Errors
///
/// Returns [`MessageError::EmptyCreateResponse`] when there is no body,
/// [`MessageError::BadStatusCreateResponse`] when the body status is not 200
/// and [`MessageError::PartialPayloadFailure`] unless `all_succeeded` is
/// exactly `true`.
pub fn validate_group_response(response: &ServiceResponse) -> Result<(), MessageError> {
    let body = non_empty_body(response).ok_or(MessageError::EmptyCreateResponse)?;
    let status = body_status(body);
    if !is_ok_status(&status) {
        return Err(MessageError::BadStatusCreateResponse(status));
    }
    if body.get("all_succeeded") != Some(&Value::Bool(true)) {
        return Err(MessageError::PartialPayloadFailure(
            partition_group_responses(body.get("responses")),
        ));
    }
    Ok(())
}

/// Returns the message id from a create response body when it is a string.
#[must_use]
pub fn extract_message_id(body: Option<&Value>) -> Option<String> {
    body?
        .get("message_id")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Splits per-message group results on their own `status` field.
///
/// Entries whose status is the string `"success"` succeeded; everything else
/// failed. A missing or non-list value yields two empty lists.
#[must_use]
pub fn partition_group_responses(responses: Option<&Value>) -> PartitionedResponses {
    let Some(Value::Array(entries)) = responses else {
        return PartitionedResponses::default();
    };
    let (succeeded, failed): (Vec<Value>, Vec<Value>) = entries
        .iter()
        .cloned()
        .partition(|entry| entry.get("status").and_then(Value::as_str) == Some(MEMBER_SUCCESS));
    PartitionedResponses::new(succeeded, failed)
}

fn non_empty_body(response: &ServiceResponse) -> Option<&Value> {
    if response.has_empty_body() {
        None
    } else {
        response.body()
    }
}

fn body_status(body: &Value) -> Value {
    body.get("status").cloned().unwrap_or(Value::Null)
}

// Numeric comparison, so `200.0` is accepted and `"200"` is not.
fn is_ok_status(status: &Value) -> bool {
    status.as_f64() == Some(OK_STATUS)
}

fn field_name(field: &Value) -> String {
    field
        .as_str()
        .map_or_else(|| field.to_string(), str::to_owned)
}

