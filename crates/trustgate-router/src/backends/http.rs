// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-over-HTTP provider backend.
//!
//! Wire contract:
//! - `GET {endpoint}/health` answers 2xx when the provider can take traffic.
//! - `POST {endpoint}/generate` takes a [`GenerateRequest`] and answers with a
//!   [`GenerateResponse`].
//!
//! Timeouts are owned by the router; the client itself only carries a generous
//! connection-level ceiling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trustgate_core::types::{GenerateOptions, GenerateOutput};
use trustgate_core::{GatewayError, ProviderBackend};

use crate::redact::redact;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Request body for `POST /generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub interaction_id: &'a str,
    pub routing_tier: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_units: Option<u32>,
}

/// Response body for `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub output_text: String,
    #[serde(default)]
    pub units_in: u32,
    #[serde(default)]
    pub units_out: u32,
    #[serde(default)]
    pub model: Option<String>,
}

/// HTTP client for one provider endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    id: String,
    client: reqwest::Client,
    base_url: String,
    model_name: String,
    api_key: Option<String>,
}

impl HttpBackend {
    /// Creates a client for `endpoint`. `api_key`, when present, is sent as a bearer token.
    pub fn new(
        id: impl Into<String>,
        endpoint: &str,
        model_name: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, GatewayError> {
        let id = id.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                GatewayError::Config(format!("provider `{id}`: api_key is not a valid header value"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Config(format!("provider `{id}`: failed to build HTTP client: {e}")))?;

        Ok(Self {
            id,
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            model_name: model_name.into(),
            api_key,
        })
    }

    fn unavailable(&self, message: impl AsRef<str>, status: Option<u16>) -> GatewayError {
        let known: Vec<&str> = self.api_key.as_deref().into_iter().collect();
        GatewayError::ProviderUnavailable {
            provider: self.id.clone(),
            message: redact(message.as_ref(), &known),
            status,
        }
    }
}

#[async_trait]
impl ProviderBackend for HttpBackend {
    async fn probe(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(response) => {
                debug!(provider = %self.id, status = %response.status(), "health probe answered");
                response.status().is_success()
            }
            Err(e) => {
                debug!(provider = %self.id, error = %redact(&e.to_string(), &[]), "health probe failed");
                false
            }
        }
    }

    async fn generate(
        &self,
        payload: &str,
        options: &GenerateOptions,
    ) -> Result<GenerateOutput, GatewayError> {
        let body = GenerateRequest {
            model: &self.model_name,
            prompt: payload,
            interaction_id: options.interaction_id.as_str(),
            routing_tier: &options.routing_tier,
            max_units: options.max_units,
        };

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.unavailable(format!("HTTP request failed: {e}"), None))?;

        let status = response.status();
        debug!(provider = %self.id, status = %status, "generate response received");

        // Only the status leaves this function. The body may quote the request.
        if !status.is_success() {
            return Err(self.unavailable(format!("provider returned {status}"), Some(status.as_u16())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.unavailable(format!("failed to read response body: {e}"), None))?;
        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| self.unavailable(format!("failed to parse response: {e}"), None))?;

        Ok(GenerateOutput {
            output_text: parsed.output_text,
            units_in: parsed.units_in,
            units_out: parsed.units_out,
            model_name: parsed.model.or_else(|| Some(self.model_name.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::InteractionId;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> GenerateOptions {
        GenerateOptions {
            interaction_id: InteractionId("int-1".into()),
            routing_tier: "verified".into(),
            max_units: None,
        }
    }

    #[tokio::test]
    async fn probe_reports_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let backend = HttpBackend::new("p", &server.uri(), "m", None).unwrap();
        assert!(backend.probe().await);
    }

    #[tokio::test]
    async fn probe_reports_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let backend = HttpBackend::new("p", &server.uri(), "m", None).unwrap();
        assert!(!backend.probe().await);
    }

    #[tokio::test]
    async fn generate_parses_response_and_sends_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("authorization", "Bearer tg-secret-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "std-1",
                "prompt": "hello [NAME]",
                "interaction_id": "int-1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "output_text": "hi!",
                "units_in": 3,
                "units_out": 2,
            })))
            .mount(&server)
            .await;

        let backend =
            HttpBackend::new("cloud-standard", &server.uri(), "std-1", Some("tg-secret-key".into())).unwrap();
        let out = backend.generate("hello [NAME]", &options()).await.unwrap();
        assert_eq!(out.output_text, "hi!");
        assert_eq!(out.units_used(), 5);
        assert_eq!(out.model_name.as_deref(), Some("std-1"));
    }

    #[tokio::test]
    async fn error_body_is_not_copied_into_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("bad key tg-secret-key for prompt: wombat ledger"),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new("p", &server.uri(), "m", Some("tg-secret-key".into())).unwrap();
        let err = backend.generate("wombat ledger", &options()).await.unwrap_err();
        match err {
            GatewayError::ProviderUnavailable { provider, message, status } => {
                assert_eq!(provider, "p");
                assert_eq!(status, Some(401));
                assert!(message.contains("401"));
                assert!(!message.contains("tg-secret-key"), "leaked: {message}");
                assert!(!message.contains("wombat"), "leaked: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new("p", &server.uri(), "m", None).unwrap();
        let err = backend.generate("x", &options()).await.unwrap_err();
        assert!(matches!(err, GatewayError::ProviderUnavailable { .. }));
    }
}
