//! TCP plumbing between clients and the HTTP layer.
//!
//! # Data Flow
//! ```text
//! client connects
//!     → listener.rs (wait for a free slot, accept)
//!     → connection.rs (id, live count, exchange state)
//!     → http::server::serve_connection
//!
//! Exchange states:
//!     Receiving → Processing → Responding → Closed
//! ```
//!
//! # Design Decisions
//! - At most `max_connections` clients are served at once
//! - One request and one reply per connection, then close

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionState, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
