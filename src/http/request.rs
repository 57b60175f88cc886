//! Parsed request model and its wire form.
//!
//! # Design Decisions
//! - Headers are an ordered list, replayed to the origin in insertion order
//! - The outgoing request line is always downgraded to `HTTP/1.0`
//! - Only the connection task that parsed a request ever touches it

use std::fmt;
use std::net::SocketAddr;

use crate::http::authority::DEFAULT_PORT;

/// HTTP verbs the proxy recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Parse a method token, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        const METHODS: [Method; 5] = [
            Method::Get,
            Method::Head,
            Method::Post,
            Method::Put,
            Method::Delete,
        ];
        METHODS
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the proxy forwards this method.
    pub fn is_supported(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `Name: Value` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_host(&self) -> bool {
        self.name.eq_ignore_ascii_case("host")
    }
}

/// One client request, as parsed and later sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Requesting peer, kept for diagnostics.
    pub client_address: SocketAddr,
    /// Origin hostname. Empty until a Host header or absolute target supplies it.
    pub host: String,
    pub port: u16,
    pub path: String,
    pub headers: Vec<Header>,
}

impl Request {
    /// The first Host header, if any.
    pub fn host_header(&self) -> Option<&Header> {
        self.headers.iter().find(|h| h.is_host())
    }

    /// The Host header value matching `host` and `port`.
    pub fn expected_host_value(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Relative path, non-empty host, and exactly one Host header matching it.
    pub fn is_canonical(&self) -> bool {
        let mut host_headers = self.headers.iter().filter(|h| h.is_host());
        let matches = host_headers
            .next()
            .is_some_and(|h| h.value == self.expected_host_value());
        self.path.starts_with('/') && !self.host.is_empty() && matches && host_headers.next().is_none()
    }

    /// Serialize into the request sent to the origin.
    pub fn to_wire(&self) -> String {
        let mut out = format!("{} {} HTTP/1.0\r\n", self.method, self.path);
        for header in &self.headers {
            out.push_str(&header.name);
            out.push_str(": ");
            out.push_str(&header.value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str, headers: Vec<Header>) -> Request {
        Request {
            method: Method::Get,
            client_address: "127.0.0.1:5000".parse().unwrap(),
            host: "example.com".into(),
            port: 80,
            path: path.into(),
            headers,
        }
    }

    #[test]
    fn method_tokens_ignore_case() {
        assert_eq!(Method::from_token("get"), Some(Method::Get));
        assert_eq!(Method::from_token("DeLeTe"), Some(Method::Delete));
        assert_eq!(Method::from_token("PATCH"), None);
        assert!(Method::Get.is_supported());
        assert!(!Method::Head.is_supported());
    }

    #[test]
    fn wire_form_downgrades_version() {
        let req = request(
            "/a",
            vec![
                Header::new("Host", "example.com"),
                Header::new("Accept", "text/html"),
            ],
        );
        assert_eq!(
            req.to_wire(),
            "GET /a HTTP/1.0\r\nHost: example.com\r\nAccept: text/html\r\n\r\n"
        );
    }

    #[test]
    fn canonical_form_checks() {
        let good = request("/", vec![Header::new("Host", "example.com")]);
        assert!(good.is_canonical());

        let absolute = request("http://example.com/", vec![Header::new("Host", "example.com")]);
        assert!(!absolute.is_canonical());

        let duplicated = request(
            "/",
            vec![Header::new("Host", "example.com"), Header::new("host", "example.com")],
        );
        assert!(!duplicated.is_canonical());

        let mut other_port = good.clone();
        other_port.port = 8080;
        assert!(!other_port.is_canonical());
        other_port.headers[0].value = "example.com:8080".into();
        assert!(other_port.is_canonical());
    }
}
