//! Claim Submitter Port - one attempt at registering a cashless claim.
//!
//! Retrying is the caller's job; implementations make exactly one request
//! and classify the failure so the caller can tell transient from terminal.

use async_trait::async_trait;

use crate::domain::claims::{ClaimReceipt, ClaimRequest};

/// Marker some gateways put in the body of an otherwise generic error.
const GATEWAY_TIMEOUT_MARKER: &str = "gateway timeout";

/// Claim submission errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("connection timed out")]
    Timeout,

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("claim rejected: {0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClaimError {
    /// Returns true for failures worth another attempt: timeouts, DNS
    /// failures, refused connections, 502/503/504 and gateway-timeout bodies.
    pub fn is_transient(&self) -> bool {
        match self {
            ClaimError::Timeout | ClaimError::Dns(_) | ClaimError::ConnectionRefused(_) => true,
            ClaimError::Http { status, body } => {
                matches!(status, 502 | 503 | 504)
                    || body.to_lowercase().contains(GATEWAY_TIMEOUT_MARKER)
            }
            ClaimError::Network(message) | ClaimError::Rejected(message) => {
                message.to_lowercase().contains(GATEWAY_TIMEOUT_MARKER)
            }
            ClaimError::InvalidResponse(_) => false,
        }
    }
}

/// Port for the claims API.
#[async_trait]
pub trait ClaimSubmitter: Send + Sync {
    async fn submit(&self, request: &ClaimRequest) -> Result<ClaimReceipt, ClaimError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures() {
        assert!(ClaimError::Timeout.is_transient());
        assert!(ClaimError::Dns("no such host".into()).is_transient());
        assert!(ClaimError::ConnectionRefused("127.0.0.1:9".into()).is_transient());
        for status in [502, 503, 504] {
            assert!(ClaimError::Http { status, body: String::new() }.is_transient());
        }
    }

    #[test]
    fn gateway_timeout_marker_in_body_is_transient() {
        let err = ClaimError::Http {
            status: 500,
            body: "upstream said: Gateway Timeout".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn terminal_failures() {
        assert!(!ClaimError::Http { status: 400, body: "bad".into() }.is_transient());
        assert!(!ClaimError::Http { status: 500, body: "boom".into() }.is_transient());
        assert!(!ClaimError::Rejected("policy lapsed".into()).is_transient());
        assert!(!ClaimError::InvalidResponse("not json".into()).is_transient());
    }
}
