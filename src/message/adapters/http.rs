//! HTTP transport backed by `reqwest`.

use crate::config::ClientConfig;
use crate::message::{
    domain::{CreatePayload, GroupCreatePayload, ServiceResponse, UpdateBody, UpdateQuery},
    ports::{MessageTransport, TransportError, TransportResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Sends payloads to the logging service over HTTPS.
///
/// Create and group create are JSON `POST`s. Update is a JSON `PUT` whose
/// query string carries the API key and message id. Any non-2xx HTTP status
/// is reported as [`TransportError::HttpStatus`].
#[derive(Debug, Clone)]
pub struct HttpMessageTransport {
    client: reqwest::Client,
    create_endpoint: String,
    create_group_endpoint: String,
    update_endpoint: String,
}

impl HttpMessageTransport {
    /// Creates a transport for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the HTTP client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.client_timeout())
            .build()
            .map_err(TransportError::request)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            create_endpoint: config.create_endpoint.clone(),
            create_group_endpoint: config.create_group_endpoint.clone(),
            update_endpoint: config.update_endpoint.clone(),
        }
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        debug!(endpoint, timeout = ?timeout, "sending request");
        let response = request.timeout(timeout).send().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::request(err)
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::request(err)
            }
        })?;
        debug!(endpoint, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: (!text.is_empty()).then_some(text),
            });
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(&text)
                    .map_err(|err| TransportError::Decode(err.to_string()))?,
            )
        };
        Ok(ServiceResponse::new(status.as_u16(), body))
    }
}

#[async_trait]
impl MessageTransport for HttpMessageTransport {
    async fn create_message(
        &self,
        payload: &CreatePayload,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        let request = self.client.post(&self.create_endpoint).json(payload);
        self.dispatch(request, &self.create_endpoint, timeout).await
    }

    async fn create_message_group(
        &self,
        payload: &GroupCreatePayload,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        let request = self.client.post(&self.create_group_endpoint).json(payload);
        self.dispatch(request, &self.create_group_endpoint, timeout).await
    }

    async fn update_message(
        &self,
        query: &UpdateQuery,
        body: &UpdateBody,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        let request = self
            .client
            .put(&self.update_endpoint)
            .query(query)
            .json(body);
        self.dispatch(request, &self.update_endpoint, timeout).await
    }
}
