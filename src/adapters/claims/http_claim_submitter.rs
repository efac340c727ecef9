//! HTTP claim submitter.
//!
//! Posts the flat claim payload to `{base_url}/claims/intimations` and makes
//! exactly one attempt per call. Transport failures are classified so the
//! caller's retry policy can tell transient from terminal errors.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::error::Error as _;
use std::time::Duration;

use crate::domain::claims::{ClaimReceipt, ClaimRequest};
use crate::ports::{ClaimError, ClaimSubmitter};

/// Configuration for the claims API client.
#[derive(Debug, Clone)]
pub struct HttpClaimConfig {
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpClaimConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Claims API client.
pub struct HttpClaimSubmitter {
    config: HttpClaimConfig,
    client: Client,
}

impl HttpClaimSubmitter {
    pub fn new(config: HttpClaimConfig) -> Result<Self, ClaimError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClaimError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn intimation_url(&self) -> String {
        format!("{}/claims/intimations", self.config.base_url)
    }

    /// Maps a transport error onto the claim error taxonomy.
    fn classify(err: reqwest::Error) -> ClaimError {
        if err.is_timeout() {
            return ClaimError::Timeout;
        }

        let mut chain = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push_str(": ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }
        let lower = chain.to_lowercase();

        if lower.contains("dns error") || lower.contains("failed to lookup address") {
            ClaimError::Dns(chain)
        } else if lower.contains("connection refused") {
            ClaimError::ConnectionRefused(chain)
        } else if lower.contains("timed out") {
            ClaimError::Timeout
        } else {
            ClaimError::Network(chain)
        }
    }
}

#[async_trait]
impl ClaimSubmitter for HttpClaimSubmitter {
    async fn submit(&self, request: &ClaimRequest) -> Result<ClaimReceipt, ClaimError> {
        let mut builder = self.client.post(self.intimation_url()).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = builder.send().await.map_err(Self::classify)?;
        let status = response.status();
        let body = response.text().await.map_err(Self::classify)?;

        if !status.is_success() {
            return Err(ClaimError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ClaimApiResponse = serde_json::from_str(&body)
            .map_err(|e| ClaimError::InvalidResponse(format!("{}: {}", e, body)))?;

        if !parsed.success {
            return Err(ClaimError::Rejected(
                parsed.error.unwrap_or_else(|| "claim rejected without reason".to_string()),
            ));
        }

        match (parsed.intimation_id, parsed.request_id) {
            (Some(intimation_id), Some(request_id)) => Ok(ClaimReceipt {
                intimation_id,
                request_id,
            }),
            (Some(intimation_id), None) => Ok(ClaimReceipt {
                request_id: intimation_id.clone(),
                intimation_id,
            }),
            _ => Err(ClaimError::InvalidResponse(format!(
                "success without an intimation id: {}",
                body
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClaimApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, alias = "intimationId", alias = "transactionId", alias = "transaction_id")]
    intimation_id: Option<String>,
    #[serde(default, alias = "requestId")]
    request_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::claims::ClaimRequest;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ClaimRequest {
        ClaimRequest {
            policy_number: "POL-1001".into(),
            policyholder_name: "Asha Rao".into(),
            member_id: "MEM-7".into(),
            mobile: "+919800000000".into(),
            email: "asha@example.com".into(),
            insurer: "Care Health".into(),
            patient_relation: "spouse".into(),
            medical_reason: "hand fracture".into(),
            department: Some("orthopedics".into()),
            hospital_id: "seven-star-nagpur".into(),
            hospital_name: "Seven Star Multispeciality Hospital".into(),
            hospital_address: "Jaripatka Ring Road, Nagpur".into(),
            hospital_city: "Nagpur".into(),
            estimated_cost: 20000,
            admission_date: "2026-10-17".into(),
            admission_time: Some("10:00".into()),
        }
    }

    fn submitter(server: &MockServer) -> HttpClaimSubmitter {
        HttpClaimSubmitter::new(HttpClaimConfig::new(server.uri()).with_api_key("claims-key")).unwrap()
    }

    mod success {
        use super::*;

        #[tokio::test]
        async fn posts_flat_payload_and_reads_ids() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/claims/intimations"))
                .and(header("Authorization", "Bearer claims-key"))
                .and(body_partial_json(serde_json::json!({
                    "policy_number": "POL-1001",
                    "estimated_cost": 20000
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "success": true,
                    "transactionId": "INT-2026-001",
                    "requestId": "REQ-9"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let receipt = submitter(&server).submit(&request()).await.unwrap();
            assert_eq!(receipt.intimation_id, "INT-2026-001");
            assert_eq!(receipt.request_id, "REQ-9");
        }

        #[tokio::test]
        async fn missing_request_id_reuses_intimation_id() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "success": true,
                    "intimation_id": "INT-1"
                })))
                .mount(&server)
                .await;

            let receipt = submitter(&server).submit(&request()).await.unwrap();
            assert_eq!(receipt.request_id, "INT-1");
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn service_unavailable_is_transient() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
                .mount(&server)
                .await;

            let err = submitter(&server).submit(&request()).await.unwrap_err();
            assert_eq!(err, ClaimError::Http { status: 503, body: "try later".into() });
            assert!(err.is_transient());
        }

        #[tokio::test]
        async fn bad_request_is_terminal() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(400).set_body_string("invalid policy"))
                .mount(&server)
                .await;

            let err = submitter(&server).submit(&request()).await.unwrap_err();
            assert!(!err.is_transient());
        }

        #[tokio::test]
        async fn rejection_carries_reason() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "success": false,
                    "error": "policy lapsed"
                })))
                .mount(&server)
                .await;

            let err = submitter(&server).submit(&request()).await.unwrap_err();
            assert_eq!(err, ClaimError::Rejected("policy lapsed".into()));
        }

        #[tokio::test]
        async fn garbage_body_is_invalid_response() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
                .mount(&server)
                .await;

            let err = submitter(&server).submit(&request()).await.unwrap_err();
            assert!(matches!(err, ClaimError::InvalidResponse(_)));
        }

        #[tokio::test]
        async fn slow_server_times_out() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
                .mount(&server)
                .await;

            let submitter = HttpClaimSubmitter::new(
                HttpClaimConfig::new(server.uri()).with_timeout(Duration::from_millis(50)),
            )
            .unwrap();
            let err = submitter.submit(&request()).await.unwrap_err();
            assert_eq!(err, ClaimError::Timeout);
        }

        #[tokio::test]
        async fn closed_port_is_connection_refused() {
            let submitter = HttpClaimSubmitter::new(HttpClaimConfig::new("http://127.0.0.1:1")).unwrap();
            let err = submitter.submit(&request()).await.unwrap_err();
            assert!(err.is_transient(), "unexpected error: {:?}", err);
        }
    }
}
