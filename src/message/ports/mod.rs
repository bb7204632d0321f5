//! Port definitions for the message subsystem.
//!
//! The service depends on these traits only; concrete adapters live in
//! [`crate::message::adapters`].

pub mod transport;

pub use transport::{MessageTransport, TransportError, TransportResult};

#[cfg(test)]
pub use transport::MockMessageTransport;
