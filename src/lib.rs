//! Chatbase client: message creation, grouped creation and update against
//! the Chatbase message-logging API.
//!
//! The crate models each logged interaction as a [`message::domain::Message`]
//! whose lifecycle (create, then optionally one update) is tracked locally,
//! and ships only the fields that are eligible for each request.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: messages, groups, lifecycle state and wire payloads
//! - **Ports**: the transport contract used to reach the service
//! - **Adapters**: an HTTP transport (`reqwest`) and an in-memory transport
//! - **Services**: the send/update state machine and the message factory
//!
//! # Modules
//!
//! - [`message`]: message lifecycle, payload export and response validation
//! - [`config`]: endpoint and timeout configuration

pub mod config;
pub mod message;
