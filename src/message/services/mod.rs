//! Services orchestrating message domain operations.

pub mod delivery;
pub mod factory;

pub use delivery::MessageService;
pub use factory::MessageFactory;
