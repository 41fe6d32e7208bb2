//! noderelay - Transparent Relay Proxy
//!
//! Routes inbound connections to dynamically-addressed backend nodes and
//! relays raw bytes between client and backend.

pub mod config;
pub mod http;
pub mod proxy;
pub mod registry;
pub mod routing;
pub mod server;
