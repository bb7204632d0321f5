//! Message lifecycle, payload export and response validation.
//!
//! # Architecture
//!
//! - **Domain**: [`domain::Message`], [`domain::MessageGroup`],
//!   [`domain::LifecycleState`] and the wire payload types
//! - **Validation**: field predicates ([`validation::rules`]) and service
//!   response checks ([`validation::response`])
//! - **Ports**: [`ports::MessageTransport`]
//! - **Adapters**: [`adapters::HttpMessageTransport`],
//!   [`adapters::InMemoryMessageTransport`]
//! - **Services**: [`services::MessageService`] drives create and update
//!   requests; [`services::MessageFactory`] stamps out messages from shared
//!   defaults
//!
//! # Example
//!
//! ```
//! use chatbase_client::message::domain::{Message, MessageType};
//! use mockable::DefaultClock;
//!
//! let mut message = Message::with_credentials("api-key", "user-1", &DefaultClock);
//! message
//!     .set_platform("slack")
//!     .set_message("hello there")
//!     .set_as_type_user()
//!     .set_as_not_handled();
//!
//! let payload = message.export_create_payload().expect("valid payload");
//! assert_eq!(payload.message_type, MessageType::User);
//! assert!(payload.not_handled.is_some());
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
