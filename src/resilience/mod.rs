//! Deadlines for blocking network steps.
//!
//! Client receive, origin connect and origin read each run under an
//! optional deadline from configuration. Expiry is mapped by the caller;
//! nothing is retried.

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
