//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 front end of the proxy: enough of the
//! protocol to read one request, decide whether it names a relay target, and
//! either answer it conventionally or hand the raw socket over to the relay.
//!
//! # Architecture
//!
//! - **`connection`**: The main connection handler implementing the request-response
//!   state machine, plus the hijack capability the relay uses to detach the socket
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and wire serialization for forwarding
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Match the path against the route table
//!        └──────┬───────────┘
//!               │
//!               ├─ Route matched → relay (socket hijacked) → Closed
//!               │
//!               ▼ No route
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
