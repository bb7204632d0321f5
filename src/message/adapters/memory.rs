//! In-memory transport for tests and offline use.

use crate::message::{
    domain::{CreatePayload, GroupCreatePayload, ServiceResponse, UpdateBody, UpdateQuery},
    ports::{MessageTransport, TransportError, TransportResult},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// A request observed by [`InMemoryMessageTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    /// A single create request.
    Create(CreatePayload),
    /// A group create request.
    CreateGroup(GroupCreatePayload),
    /// An update request.
    Update {
        /// Query identifying the message.
        query: UpdateQuery,
        /// Changed fields.
        body: UpdateBody,
    },
}

/// Transport that replays scripted responses and records every request.
///
/// Responses are queued per operation and consumed in order. A call with
/// nothing queued fails with [`TransportError::Unavailable`]. Clones share
/// the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    create_responses: VecDeque<TransportResult<ServiceResponse>>,
    group_responses: VecDeque<TransportResult<ServiceResponse>>,
    update_responses: VecDeque<TransportResult<ServiceResponse>>,
    requests: Vec<RecordedRequest>,
    latency: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Create,
    CreateGroup,
    Update,
}

impl Operation {
    const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::CreateGroup => "group create",
            Self::Update => "update",
        }
    }
}

impl InMemoryTransportState {
    const fn queue(
        &mut self,
        operation: Operation,
    ) -> &mut VecDeque<TransportResult<ServiceResponse>> {
        match operation {
            Operation::Create => &mut self.create_responses,
            Operation::CreateGroup => &mut self.group_responses,
            Operation::Update => &mut self.update_responses,
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> TransportError {
    TransportError::request(std::io::Error::other(err.to_string()))
}

impl InMemoryMessageTransport {
    /// Creates a transport with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next create request.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn push_create_response(
        &self,
        outcome: TransportResult<ServiceResponse>,
    ) -> TransportResult<()> {
        self.push(Operation::Create, outcome)
    }

    /// Queues the outcome of the next group create request.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn push_group_response(
        &self,
        outcome: TransportResult<ServiceResponse>,
    ) -> TransportResult<()> {
        self.push(Operation::CreateGroup, outcome)
    }

    /// Queues the outcome of the next update request.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn push_update_response(
        &self,
        outcome: TransportResult<ServiceResponse>,
    ) -> TransportResult<()> {
        self.push(Operation::Update, outcome)
    }

    /// Delays every response by `latency`.
    ///
    /// A latency longer than the request timeout yields
    /// [`TransportError::Timeout`] once the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_latency(&self, latency: Duration) -> TransportResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.latency = Some(latency);
        Ok(())
    }

    /// Returns every request received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn requests(&self) -> TransportResult<Vec<RecordedRequest>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.requests.clone())
    }

    fn push(
        &self,
        operation: Operation,
        outcome: TransportResult<ServiceResponse>,
    ) -> TransportResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.queue(operation).push_back(outcome);
        Ok(())
    }

    async fn respond(
        &self,
        operation: Operation,
        request: RecordedRequest,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        let (outcome, latency) = {
            let mut state = self.state.write().map_err(lock_error)?;
            state.requests.push(request);
            let outcome = state.queue(operation).pop_front();
            (outcome, state.latency)
        };

        if let Some(delay) = latency {
            if delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(TransportError::Timeout(timeout));
            }
            tokio::time::sleep(delay).await;
        }

        outcome.unwrap_or_else(|| {
            Err(TransportError::Unavailable(format!(
                "no {} response queued",
                operation.name()
            )))
        })
    }
}

#[async_trait]
impl MessageTransport for InMemoryMessageTransport {
    async fn create_message(
        &self,
        payload: &CreatePayload,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        self.respond(
            Operation::Create,
            RecordedRequest::Create(payload.clone()),
            timeout,
        )
        .await
    }

    async fn create_message_group(
        &self,
        payload: &GroupCreatePayload,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        self.respond(
            Operation::CreateGroup,
            RecordedRequest::CreateGroup(payload.clone()),
            timeout,
        )
        .await
    }

    async fn update_message(
        &self,
        query: &UpdateQuery,
        body: &UpdateBody,
        timeout: Duration,
    ) -> TransportResult<ServiceResponse> {
        self.respond(
            Operation::Update,
            RecordedRequest::Update {
                query: query.clone(),
                body: body.clone(),
            },
            timeout,
        )
        .await
    }
}
