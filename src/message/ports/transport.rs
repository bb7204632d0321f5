//! Transport port for the logging service's create, group create and update
//! endpoints.

use crate::message::domain::{
    CreatePayload, GroupCreatePayload, ServiceResponse, UpdateBody, UpdateQuery,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Delivers payloads to the logging service.
///
/// Each call issues exactly one request and resolves with the decoded
/// response. Validating the response contents is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Sends a single create request.
    async fn create_message(
        &self,
        payload: &CreatePayload,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse>;

    /// Sends a group create request.
    async fn create_message_group(
        &self,
        payload: &GroupCreatePayload,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse>;

    /// Sends an update request: `query` identifies the message and `body`
    /// carries the changed fields.
    async fn update_message(
        &self,
        query: &UpdateQuery,
        body: &UpdateBody,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse>;
}

/// Errors returned by transport adapters.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No response arrived within the timeout.
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The service answered with a non-success HTTP status.
    #[error("service responded with HTTP status {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body, when one was readable.
        body: Option<String>,
    },

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(Arc<dyn std::error::Error + Send + Sync>),

    /// The response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The transport cannot serve the request at all.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Wraps a request failure from the underlying client.
    pub fn request(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Request(Arc::new(err))
    }
}
