//! HTTP request processing subsystem.
//!
//! # Data Flow
//! ```text
//! raw client text
//!     → validator.rs (fixed-order checks → Verdict)
//!     → parser.rs (request line + ordered headers → Request)
//!     → sanitizer.rs (absolute URI → relative path + single Host header)
//!     → Request (canonical) or ErrorResponse (400/501)
//! ```
//!
//! # Design Decisions
//! - Verdict is a closed enum matched exhaustively by the pipeline
//! - Parsing never panics, even on text that skipped validation
//! - The wire form always speaks HTTP/1.0 to the origin

pub mod authority;
pub mod parser;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod sanitizer;
pub mod server;
pub mod validator;

pub use pipeline::process;
pub use request::{Header, Method, Request};
pub use response::ErrorResponse;
pub use server::ProxyServer;
pub use validator::{Rejection, Validator, Verdict};
