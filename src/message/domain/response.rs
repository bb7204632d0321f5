//! Service responses as seen by the domain.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response returned by the transport for a completed HTTP exchange.
///
/// `status` is the HTTP status code; the service's own status lives inside
/// `body` and is what response validation inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    status: u16,
    body: Option<Value>,
}

impl ServiceResponse {
    /// Creates a response from an HTTP status and an optional JSON body.
    #[must_use]
    pub const fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Creates an HTTP 200 response carrying `body`.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    /// Creates a response with no body.
    #[must_use]
    pub const fn empty(status: u16) -> Self {
        Self::new(status, None)
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the decoded body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns `true` when the body is absent or a falsy JSON scalar:
    /// `null`, `false`, zero or the empty string.
    #[must_use]
    pub fn has_empty_body(&self) -> bool {
        !self.body.as_ref().is_some_and(is_truthy)
    }

    /// Consumes the response and returns its body.
    #[must_use]
    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}

/// Truthiness of a JSON value: `null`, `false`, zero and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Per-message results of a group create, split by their own status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionedResponses {
    succeeded: Vec<Value>,
    failed: Vec<Value>,
}

impl PartitionedResponses {
    /// Creates a partition from already-sorted entries.
    #[must_use]
    pub const fn new(succeeded: Vec<Value>, failed: Vec<Value>) -> Self {
        Self { succeeded, failed }
    }

    /// Entries whose `status` was the string `"success"`.
    #[must_use]
    pub fn succeeded(&self) -> &[Value] {
        &self.succeeded
    }

    /// Every other entry.
    #[must_use]
    pub fn failed(&self) -> &[Value] {
        &self.failed
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Returns `true` when no entries were partitioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}
