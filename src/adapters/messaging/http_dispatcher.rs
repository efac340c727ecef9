//! Messaging gateway client.
//!
//! Posts `{"to": ..., "text": ...}` to the gateway URL. Any non-2xx status
//! is a rejected delivery; transport errors mean the gateway is unavailable.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::foundation::CustomerId;
use crate::ports::{DispatchError, MessageDispatcher};

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    to: &'a str,
    text: &'a str,
}

pub struct HttpDispatcher {
    url: String,
    client: Client,
}

impl HttpDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Unavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl MessageDispatcher for HttpDispatcher {
    async fn send(&self, customer_id: &CustomerId, text: &str) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.url)
            .json(&OutboundMessage {
                to: customer_id.as_str(),
                text,
            })
            .send()
            .await
            .map_err(|e| DispatchError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DispatchError::Rejected(format!("{}: {}", status, body)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({ "to": "cust-1", "text": "hello" })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = HttpDispatcher::new(server.uri(), Duration::from_secs(5)).unwrap();
        dispatcher
            .send(&CustomerId::new("cust-1").unwrap(), "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("unknown recipient"))
            .mount(&server)
            .await;

        let dispatcher = HttpDispatcher::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = dispatcher
            .send(&CustomerId::new("cust-1").unwrap(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Rejected(_)));
    }
}
