//! Webhook delivery over HTTP POST.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use tracing::debug;

use crate::severity::Severity;
use crate::{Notifier, NotifyError, NotifyResult};

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON payload posted to the webhook endpoint.
#[derive(Serialize)]
struct WebhookPayload<'a> {
    channel: &'a str,
    text: &'a str,
    color: &'a str,
}

/// Posts notifications to a single webhook URL.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client<HttpConnector, Full<Bytes>>,
    url: String,
    send_timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            url: url.to_string(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Override the delivery timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, channel: &str, message: &str, severity: Severity) -> NotifyResult<()> {
        let payload = WebhookPayload {
            channel,
            text: message,
            color: severity.color(),
        };
        let body =
            serde_json::to_vec(&payload).map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let req = http::Request::builder()
            .method("POST")
            .uri(&self.url)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let resp = tokio::time::timeout(self.send_timeout, self.client.request(req))
            .await
            .map_err(|_| NotifyError::Timeout(self.send_timeout))?
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status()));
        }
        debug!(%channel, %severity, "notification delivered");
        Ok(())
    }
}
