//! Domain types for the message subsystem.
//!
//! This module holds the message aggregate, its lifecycle state, message
//! groups and the wire payloads exported from them. Nothing here performs
//! I/O; requests are issued by [`crate::message::services`].

mod defaults;
mod group;
mod lifecycle;
mod message;
mod payload;
mod response;

pub use defaults::{DEFAULT_CLIENT_TIMEOUT, MessageDefaults};
pub use group::MessageGroup;
pub use lifecycle::{LifecycleFailure, LifecycleState, OptionsManifest, UpdateBlock, UpdateField};
pub use message::{Message, MessageBinding, MessageType, ParseMessageTypeError};
pub use payload::{
    CreatePayload, GroupCreatePayload, TrueFlag, UpdateBody, UpdatePayload, UpdateQuery,
};
pub use response::{PartitionedResponses, ServiceResponse};
pub(crate) use response::is_truthy;
