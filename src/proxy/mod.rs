//! Connection routing and relay
//!
//! This module implements the core proxy logic: resolving routing metadata
//! into a backend address, deciding the outbound transport, and relaying raw
//! bytes once the client socket has been hijacked.

pub mod dial;
pub mod relay;
pub mod resolver;

pub use dial::{BoxedStream, Dialer, NetDialer, Transport};
pub use relay::RelayHandler;
pub use resolver::{direct, resolve_target, ResolvedTarget};
