// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trustgate ask` command implementation.
//!
//! Runs one request through a gateway built from configuration and returns
//! the caller-facing response.

use chrono::Utc;
use clap::Args;
use trustgate_config::GatewayConfig;
use trustgate_core::types::RequestMeta;
use trustgate_core::{GatewayError, GatewayRequest, GatewayResponse, UserContext};
use trustgate_gateway::Gateway;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// User id asserted by the identity source.
    #[arg(long)]
    pub user: String,

    /// Trust score in [0, 100].
    #[arg(long)]
    pub trust: f64,

    /// Device or session fingerprint. Defaults to one derived from the user id.
    #[arg(long)]
    pub fingerprint: Option<String>,

    /// Channel recorded in the request metadata.
    #[arg(long, default_value = "cli")]
    pub channel: String,

    /// The request text.
    pub message: String,
}

impl AskArgs {
    fn into_request(self) -> GatewayRequest {
        let fingerprint = self
            .fingerprint
            .unwrap_or_else(|| format!("cli-{}", self.user));
        GatewayRequest {
            user: UserContext::new(self.user, fingerprint, self.trust),
            meta: RequestMeta {
                channel: self.channel,
                requested_at: Utc::now(),
            },
            payload: self.message,
        }
    }
}

/// Run the `trustgate ask` command.
pub async fn run_ask(config: GatewayConfig, args: AskArgs) -> Result<GatewayResponse, GatewayError> {
    let gateway = Gateway::from_config(config).await?;
    gateway.handle(args.into_request()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_config::model::StoreBackend;

    fn args(trust: f64, message: &str) -> AskArgs {
        AskArgs {
            user: "cli-user".into(),
            trust,
            fingerprint: None,
            channel: "cli".into(),
            message: message.into(),
        }
    }

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.storage.backend = StoreBackend::Memory;
        config.transform.salt_secret = Some("cli-test".into());
        config
    }

    #[test]
    fn fingerprint_defaults_from_user() {
        let request = args(50.0, "hi").into_request();
        assert_eq!(request.user.fingerprint, "cli-cli-user");
        assert_eq!(request.user.trust_score, Some(50.0));
        assert_eq!(request.meta.channel, "cli");
    }

    #[tokio::test]
    async fn high_trust_ask_is_served_by_local_echo() {
        let response = run_ask(config(), args(92.0, "Outline a study plan")).await.unwrap();
        assert_eq!(response.provider, "local");
        assert!(response.output_text.starts_with("[local-echo]"));
    }

    #[tokio::test]
    async fn out_of_range_trust_is_rejected() {
        let err = run_ask(config(), args(101.0, "hi")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { .. }));
    }
}
