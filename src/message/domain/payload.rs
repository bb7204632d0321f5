//! Wire payloads exported from messages and groups.

use super::{MessageType, OptionsManifest, UpdateField};
use serde::{Deserialize, Serialize};

/// A flag that is either sent as the string `"true"` or omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrueFlag {
    /// Serialised as `"true"`.
    #[serde(rename = "true")]
    True,
}

impl TrueFlag {
    /// Returns `Some(TrueFlag::True)` when `value` is set.
    #[must_use]
    pub const fn from_bool(value: bool) -> Option<Self> {
        if value { Some(Self::True) } else { None }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePayload {
    /// API key.
    pub api_key: String,
    /// End-user id.
    pub user_id: String,
    /// Message author.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Milliseconds since the Unix epoch.
    pub time_stamp: String,
    /// Originating platform.
    pub platform: String,
    /// Message body.
    pub message: String,
    /// Dialog intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Bot version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Agent response time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    /// Custom session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_session_id: Option<String>,
    /// Present only when the message was not handled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_handled: Option<TrueFlag>,
    /// Present only when the message is feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<TrueFlag>,
}

/// Body of a group create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCreatePayload {
    /// Exported member payloads, in insertion order.
    pub messages: Vec<CreatePayload>,
}

/// Everything an update request may carry, before it is split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    /// API key.
    pub api_key: String,
    /// Service-assigned message id.
    pub message_id: String,
    /// Dialog intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Bot version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Not-handled flag.
    pub not_handled: bool,
    /// Feedback flag.
    pub feedback: bool,
}

impl UpdatePayload {
    /// Splits the payload into the query identifying the message and a body
    /// holding only the fields flagged in `manifest`.
    ///
    /// A flagged optional field that is unset is left out of the body.
    #[must_use]
    pub fn split(self, manifest: &OptionsManifest) -> (UpdateQuery, UpdateBody) {
        let mut body = UpdateBody::default();
        for field in manifest.flagged() {
            match field {
                UpdateField::Intent => body.intent.clone_from(&self.intent),
                UpdateField::NotHandled => body.not_handled = Some(self.not_handled),
                UpdateField::Version => body.version.clone_from(&self.version),
                UpdateField::Feedback => body.feedback = Some(self.feedback),
            }
        }
        let query = UpdateQuery {
            api_key: self.api_key,
            message_id: self.message_id,
        };
        (query, body)
    }
}

/// Query parameters of an update request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateQuery {
    /// API key.
    pub api_key: String,
    /// Service-assigned message id.
    pub message_id: String,
}

/// JSON body of an update request; holds only the flagged fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBody {
    /// Dialog intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Not-handled flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_handled: Option<bool>,
    /// Bot version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Feedback flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<bool>,
}

impl UpdateBody {
    /// Returns `true` when no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.intent.is_none()
            && self.not_handled.is_none()
            && self.version.is_none()
            && self.feedback.is_none()
    }
}
