//! Process lifecycle: start serving, stop on request.
//!
//! # Data Flow
//! ```text
//! startup.rs:
//!     ProxyConfig → metrics exporter (optional) → bind listener → accept loop
//!
//! signals.rs:
//!     Ctrl+C / SIGTERM → Shutdown::trigger
//!
//! shutdown.rs:
//!     trigger → accept loop stops → live connections drain (bounded) → exit
//! ```
//!
//! # Design Decisions
//! - Any startup failure ends the process with an error
//! - A drain that outlives `drain_timeout_secs` is abandoned

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
