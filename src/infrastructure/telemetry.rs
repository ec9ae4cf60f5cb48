//! # Telemetry
//!
//! Optional error reporting to a chat webhook (Discord-style `{content, username}` body).
//! Level 1 reports session-start failures and module errors, level 2 also
//! announces each instance start. Sends are fire-and-forget and never block a session.

use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::config::TelemetryConfig;

#[derive(Debug, Serialize, PartialEq)]
struct WebhookMessage<'a> {
    content: &'a str,
    username: &'a str,
}

#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<Inner>,
}

struct Inner {
    level: u8,
    webhook_url: Option<String>,
    username: String,
    http: Client,
}

impl Telemetry {
    pub fn new(config: &TelemetryConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            inner: Arc::new(Inner {
                level: config.level,
                webhook_url: config.webhook_url.clone(),
                username: config.username.clone(),
                http,
            }),
        }
    }

    pub fn disabled() -> Self {
        Self::new(&TelemetryConfig::default())
    }

    fn enabled_at(&self, level: u8) -> bool {
        self.inner.level >= level && self.inner.webhook_url.is_some()
    }

    pub fn report_error(&self, message: String) {
        if self.enabled_at(1) {
            self.send(message);
        }
    }

    pub fn notify_instance(&self) {
        if self.enabled_at(2) {
            self.send(format!(
                "New instance started with version {}",
                env!("CARGO_PKG_VERSION")
            ));
        }
    }

    fn send(&self, content: String) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let Some(url) = inner.webhook_url.as_deref() else {
                return;
            };
            let body = WebhookMessage {
                content: &content,
                username: &inner.username,
            };
            let result = inner
                .http
                .post(url)
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());
            if let Err(e) = result {
                tracing::warn!("telemetry webhook failed: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry(level: u8, url: Option<&str>) -> Telemetry {
        Telemetry::new(&TelemetryConfig {
            level,
            webhook_url: url.map(str::to_string),
            username: "rasbot".to_string(),
        })
    }

    #[test]
    fn test_levels() {
        let off = telemetry(0, Some("http://localhost/hook"));
        assert!(!off.enabled_at(1));

        let errors = telemetry(1, Some("http://localhost/hook"));
        assert!(errors.enabled_at(1));
        assert!(!errors.enabled_at(2));

        let everything = telemetry(2, Some("http://localhost/hook"));
        assert!(everything.enabled_at(2));

        // nowhere to send to
        assert!(!telemetry(2, None).enabled_at(1));
        assert!(!Telemetry::disabled().enabled_at(1));
    }

    #[test]
    fn test_webhook_body() {
        let body = WebhookMessage {
            content: "boom",
            username: "rasbot",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "content": "boom", "username": "rasbot" })
        );
    }
}
