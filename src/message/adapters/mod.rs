//! Adapters implementing the message transport port.

pub mod http;
pub mod memory;

pub use http::HttpMessageTransport;
pub use memory::{InMemoryMessageTransport, RecordedRequest};
