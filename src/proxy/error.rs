//! Proxy error types

use thiserror::Error;

/// Failure talking to an upstream JSON endpoint
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProxyError {
    pub kind: ProxyErrorKind,
    pub message: String,
}

impl ProxyError {
    pub fn new(kind: ProxyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProxyErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProxyErrorKind::Timeout, message)
    }

    pub fn status(code: u16) -> Self {
        Self::new(
            ProxyErrorKind::Status(code),
            format!("HTTP error! status: {code}"),
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProxyErrorKind::Decode, message)
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::new(ProxyErrorKind::InvalidBody, message)
    }

    pub(crate) fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::network(format!("Connection failed: {e}"))
        } else {
            Self::network(format!("Request failed: {e}"))
        }
    }
}

/// Error classification, used for logging and user-facing notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyErrorKind {
    /// Connection refused, reset, DNS failure
    Network,
    /// Call exceeded the configured deadline
    Timeout,
    /// Upstream answered with a non-2xx status
    Status(u16),
    /// Upstream answered 2xx but the body was not JSON
    Decode,
    /// Inbound request body was not JSON
    InvalidBody,
}

impl ProxyErrorKind {
    pub fn is_timeout(self) -> bool {
        matches!(self, Self::Timeout)
    }
}
