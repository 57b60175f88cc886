//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! canonical Request (host, path)
//!     → store.rs lookup: hit → cached OriginResponse
//!     → miss: per-key slot, single in-flight fetch → OriginForwarder
//!     → success stored for the life of the process; sentinels never stored
//! ```
//!
//! # Design Decisions
//! - Key is plain `host + path`: no query, header or case normalization
//! - No eviction, expiry or update: the first stored response wins
//! - Concurrent misses for one key share a single origin fetch

pub mod store;

pub use store::{cache_key, CacheStatus, Fetched, ResponseCache};
