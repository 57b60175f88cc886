//! Proxy-generated error replies.
//!
//! # Design Decisions
//! - The reply is a bare `<message> (<code>)\n` line, not an HTTP response
//! - Only 400 and 501 are produced; origin failures are relayed as sentinels

use std::fmt;

/// A failure reply written straight back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub status_message: &'static str,
}

impl ErrorResponse {
    pub const BAD_REQUEST: Self = Self {
        status_code: 400,
        status_message: "Bad Request",
    };

    pub const NOT_IMPLEMENTED: Self = Self {
        status_code: 501,
        status_message: "Not Implemented",
    };

    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.status_message, self.status_code)
    }
}
