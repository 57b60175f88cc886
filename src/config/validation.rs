//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a configuration for values that deserialize fine but cannot run.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }
    if config.client.read_chunk_size == 0 {
        errors.push(ValidationError::Zero("client.read_chunk_size"));
    }
    if config.client.max_reads == 0 {
        errors.push(ValidationError::Zero("client.max_reads"));
    }
    if config.origin.read_chunk_size == 0 {
        errors.push(ValidationError::Zero("origin.read_chunk_size"));
    }
    if config.origin.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("origin.connect_timeout_secs"));
    }
    if config.client.read_timeout_secs == Some(0) {
        errors.push(ValidationError::Zero("client.read_timeout_secs"));
    }
    if config.origin.read_timeout_secs == Some(0) {
        errors.push(ValidationError::Zero("origin.read_timeout_secs"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
