//! Payload and response validation.
//!
//! [`rules`] holds the field predicates run before a payload is exported.
//! [`response`] checks what the service returned and turns contract
//! violations into typed [`crate::message::error::MessageError`] values.

pub mod response;
pub mod rules;

pub use response::{
    extract_message_id, partition_group_responses, validate_create_response,
    validate_group_response, validate_update_response,
};
pub use rules::{
    validate_create_manifest, validate_feedback, validate_not_handled, validate_update_manifest,
};
