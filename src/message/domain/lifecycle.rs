//! Create/update progress tracking for a single message or group.

use super::ServiceResponse;
use crate::message::error::MessageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Fields that may be shipped in an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateField {
    /// The dialog intent.
    Intent,
    /// The not-handled flag.
    NotHandled,
    /// The bot version.
    Version,
    /// The feedback flag.
    Feedback,
}

impl UpdateField {
    /// Every updatable field, in wire order.
    pub const ALL: [Self; 4] = [Self::Intent, Self::NotHandled, Self::Version, Self::Feedback];

    /// Returns the wire field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::NotHandled => "not_handled",
            Self::Version => "version",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for UpdateField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Snapshot of which updatable fields were touched after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionsManifest {
    /// `intent` was set after creation.
    pub intent: bool,
    /// `not_handled` was set after creation.
    pub not_handled: bool,
    /// `version` was set after creation.
    pub version: bool,
    /// `feedback` was set after creation.
    pub feedback: bool,
}

impl OptionsManifest {
    /// Returns whether `field` is flagged for the next update.
    #[must_use]
    pub const fn is_flagged(&self, field: UpdateField) -> bool {
        match field {
            UpdateField::Intent => self.intent,
            UpdateField::NotHandled => self.not_handled,
            UpdateField::Version => self.version,
            UpdateField::Feedback => self.feedback,
        }
    }

    /// Returns the flagged fields in wire order.
    pub fn flagged(&self) -> impl Iterator<Item = UpdateField> + '_ {
        UpdateField::ALL
            .into_iter()
            .filter(|field| self.is_flagged(*field))
    }

    const fn flag(&mut self, field: UpdateField) {
        match field {
            UpdateField::Intent => self.intent = true,
            UpdateField::NotHandled => self.not_handled = true,
            UpdateField::Version => self.version = true,
            UpdateField::Feedback => self.feedback = true,
        }
    }
}

/// A recorded create or update failure.
///
/// Keeps the response that failed validation, when there was one, so callers
/// can inspect what the service actually returned.
#[derive(Debug, Clone)]
pub struct LifecycleFailure {
    error: MessageError,
    response: Option<ServiceResponse>,
}

impl LifecycleFailure {
    /// Creates a failure record.
    #[must_use]
    pub const fn new(error: MessageError, response: Option<ServiceResponse>) -> Self {
        Self { error, response }
    }

    /// Returns the error that caused the failure.
    #[must_use]
    pub const fn error(&self) -> &MessageError {
        &self.error
    }

    /// Returns the response that failed validation, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&ServiceResponse> {
        self.response.as_ref()
    }
}

/// Whether a message may still be updated, and if not, why.
#[derive(Debug, Clone, Copy)]
pub enum UpdateBlock<'a> {
    /// No failure has been recorded.
    Clear,
    /// Creation failed; takes precedence over an update failure.
    CreateErrored(&'a LifecycleFailure),
    /// A previous update failed.
    UpdateErrored(&'a LifecycleFailure),
}

impl<'a> UpdateBlock<'a> {
    /// Returns `true` unless the state is [`UpdateBlock::Clear`].
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        !matches!(self, Self::Clear)
    }

    /// Returns the blocking failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&'a LifecycleFailure> {
        match *self {
            Self::Clear => None,
            Self::CreateErrored(failure) | Self::UpdateErrored(failure) => Some(failure),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Phase {
    started: bool,
    completed: bool,
    failure: Option<LifecycleFailure>,
    response_body: Option<Value>,
}

/// Create and update progress owned by exactly one message or group.
///
/// Markers never refuse a transition: guarding against a second create or
/// update is the caller's job, by checking [`Self::create_started`] or
/// [`Self::update_started`] first.
///
/// # Examples
///
/// ```
/// use chatbase_client::message::domain::{LifecycleState, UpdateField};
/// use serde_json::json;
///
/// let mut state = LifecycleState::new();
/// state
///     .mark_create_started()
///     .mark_create_completed(json!({"status": 200, "message_id": "1"}))
///     .flag_field_for_update(UpdateField::Intent);
///
/// assert!(state.create_completed());
/// assert!(!state.cannot_be_updated().is_blocked());
/// assert!(state.options_manifest().intent);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LifecycleState {
    create: Phase,
    update: Phase,
    options_manifest: OptionsManifest,
}

impl LifecycleState {
    /// Creates a state with nothing started and nothing flagged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a create request is about to be issued.
    pub const fn mark_create_started(&mut self) -> &mut Self {
        self.create.started = true;
        self
    }

    /// Records a validated create response, stored verbatim.
    pub fn mark_create_completed(&mut self, response_body: Value) -> &mut Self {
        self.create.completed = true;
        self.create.response_body = Some(response_body);
        self
    }

    /// Records a create failure. Started and completed flags are untouched.
    pub fn mark_create_errored(&mut self, failure: LifecycleFailure) -> &mut Self {
        self.create.failure = Some(failure);
        self
    }

    /// Records that an update request is about to be issued.
    pub const fn mark_update_started(&mut self) -> &mut Self {
        self.update.started = true;
        self
    }

    /// Records a validated update response, stored verbatim.
    pub fn mark_update_completed(&mut self, response_body: Value) -> &mut Self {
        self.update.completed = true;
        self.update.response_body = Some(response_body);
        self
    }

    /// Records an update failure. Started and completed flags are untouched.
    pub fn mark_update_errored(&mut self, failure: LifecycleFailure) -> &mut Self {
        self.update.failure = Some(failure);
        self
    }

    /// Marks `field` dirty for the next update export.
    pub const fn flag_field_for_update(&mut self, field: UpdateField) -> &mut Self {
        self.options_manifest.flag(field);
        self
    }

    /// Returns whether a create request was started.
    #[must_use]
    pub const fn create_started(&self) -> bool {
        self.create.started
    }

    /// Returns whether a create request completed and validated.
    #[must_use]
    pub const fn create_completed(&self) -> bool {
        self.create.completed
    }

    /// Returns the recorded create failure, if any.
    #[must_use]
    pub const fn create_error(&self) -> Option<&LifecycleFailure> {
        self.create.failure.as_ref()
    }

    /// Returns the raw create response body, if create completed.
    #[must_use]
    pub const fn create_response(&self) -> Option<&Value> {
        self.create.response_body.as_ref()
    }

    /// Returns whether an update request was started.
    #[must_use]
    pub const fn update_started(&self) -> bool {
        self.update.started
    }

    /// Returns whether an update request completed and validated.
    #[must_use]
    pub const fn update_completed(&self) -> bool {
        self.update.completed
    }

    /// Returns the recorded update failure, if any.
    #[must_use]
    pub const fn update_error(&self) -> Option<&LifecycleFailure> {
        self.update.failure.as_ref()
    }

    /// Returns the raw update response body, if update completed.
    #[must_use]
    pub const fn update_response(&self) -> Option<&Value> {
        self.update.response_body.as_ref()
    }

    /// Reports whether a recorded failure blocks updates.
    #[must_use]
    pub const fn cannot_be_updated(&self) -> UpdateBlock<'_> {
        if let Some(failure) = self.create.failure.as_ref() {
            return UpdateBlock::CreateErrored(failure);
        }
        if let Some(failure) = self.update.failure.as_ref() {
            return UpdateBlock::UpdateErrored(failure);
        }
        UpdateBlock::Clear
    }

    /// Returns a copy of the dirty-field flags.
    #[must_use]
    pub const fn options_manifest(&self) -> OptionsManifest {
        self.options_manifest
    }
}
