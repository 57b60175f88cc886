//! Origin forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! canonical Request
//!     → forwarder.rs (resolve host → connect with timeout → write wire form)
//!     → read chunks until the origin closes (bounded by read deadline)
//!     → OriginResponse, or ForwardError mapped to a fixed sentinel payload
//! ```
//!
//! # Design Decisions
//! - One short-lived connection per forwarded request (HTTP/1.0 semantics)
//! - The whole response is buffered before anything reaches the client
//! - Sentinel payloads are relayed to the client but never cached

pub mod error;
pub mod forwarder;
pub mod response;

pub use error::{is_sentinel, ForwardError};
pub use forwarder::OriginForwarder;
pub use response::OriginResponse;
