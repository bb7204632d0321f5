//! Unit tests for the message module.
//!
//! Tests are organised by concept: field rules, lifecycle state, the message
//! entity, response validation, the delivery service, groups and the factory.

mod group_tests;
mod service_tests;
