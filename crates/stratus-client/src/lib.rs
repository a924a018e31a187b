//! Stratus Client - transports implementing the platform service traits.
//!
//! - [`RestClient`] talks to the regional REST endpoint.
//! - [`MockPlatform`] keeps every resource in memory for tests and demos.

pub mod mock;
pub mod rest;

pub use mock::{MockPlatform, RpcCounts};
pub use rest::RestClient;
