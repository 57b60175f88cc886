//! Raw request validation.
//!
//! # Responsibilities
//! - Decide whether raw request text is forwardable, rejected, or unsupported
//! - Report why a request was rejected for logging
//!
//! # Design Decisions
//! - Checks run in a fixed order and stop at the first failure
//! - Method, version and header names compare case-insensitively;
//!   header values are never case-folded
//! - A Host port suffix is checked against the configured `HostPortPolicy`

use thiserror::Error;

use crate::config::HostPortPolicy;
use crate::http::authority::{split_absolute_target, split_authority, PortSuffix};
use crate::http::request::Method;

const TERMINATOR: &str = "\r\n\r\n";

/// Outcome of validating one raw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    InvalidInput(Rejection),
    NotSupported(Method),
}

/// Why a request was judged `InvalidInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("request line is not 'METHOD TARGET VERSION'")]
    MalformedRequestLine,

    #[error("request does not end with a blank line")]
    MissingTerminator,

    #[error("header line is not 'Name: Value'")]
    MalformedHeader,

    #[error("host port is not a valid port number")]
    InvalidHostPort,

    #[error("request target names no host")]
    MissingHost,

    #[error("unsupported HTTP version")]
    UnsupportedVersion,

    #[error("unknown method")]
    UnknownMethod,
}

/// Validates raw request text under a fixed host-port policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: HostPortPolicy,
}

impl Validator {
    pub fn new(policy: HostPortPolicy) -> Self {
        Self { policy }
    }

    pub fn validate(&self, raw: &str) -> Verdict {
        match self.check(raw) {
            Ok(method) if method.is_supported() => Verdict::Good,
            Ok(method) => Verdict::NotSupported(method),
            Err(rejection) => Verdict::InvalidInput(rejection),
        }
    }

    fn check(&self, raw: &str) -> Result<Method, Rejection> {
        let mut lines = raw.split("\r\n");
        let request_line = lines.next().unwrap_or_default();
        let tokens: Vec<&str> = request_line.split(' ').collect();
        let &[method, target, version] = tokens.as_slice() else {
            return Err(Rejection::MalformedRequestLine);
        };

        if !raw.ends_with(TERMINATOR) {
            return Err(Rejection::MissingTerminator);
        }

        let headers: Vec<&str> = lines.filter(|line| !line.is_empty()).collect();
        for line in &headers {
            self.check_header(line)?;
        }

        if target.starts_with('/') {
            let has_host = headers.iter().any(|line| {
                line.split_once(": ")
                    .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("host"))
            });
            if !has_host {
                return Err(Rejection::MissingHost);
            }
        } else {
            let (authority, _) = split_absolute_target(target);
            let (host, port) = split_authority(authority);
            if host.is_empty() {
                return Err(Rejection::MissingHost);
            }
            self.check_port(port)?;
        }

        let version = version.trim();
        if !version.eq_ignore_ascii_case("http/1.0") && !version.eq_ignore_ascii_case("http/1.1") {
            return Err(Rejection::UnsupportedVersion);
        }

        Method::from_token(method).ok_or(Rejection::UnknownMethod)
    }

    fn check_header(&self, line: &str) -> Result<(), Rejection> {
        let parts: Vec<&str> = line.split(": ").collect();
        let is_host = parts[0].trim().eq_ignore_ascii_case("host");
        match parts.len() {
            2 => {}
            // `Host: name: 8080`
            3 if is_host && is_numeric(parts[2].trim()) => {}
            _ => return Err(Rejection::MalformedHeader),
        }

        if is_host {
            let (_, value) = line.split_once(": ").unwrap_or_default();
            let (host, port) = split_authority(value);
            if host.is_empty() {
                return Err(Rejection::MissingHost);
            }
            self.check_port(port)?;
        }
        Ok(())
    }

    fn check_port(&self, port: PortSuffix) -> Result<(), Rejection> {
        match (port, self.policy) {
            (PortSuffix::Malformed, HostPortPolicy::Reject) => Err(Rejection::InvalidHostPort),
            _ => Ok(()),
        }
    }
}

/// Validate with the default (rejecting) host-port policy.
pub fn validate(raw: &str) -> Verdict {
    Validator::default().validate(raw)
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
