//! herald-notify — delivers formatted alerts to a named channel.
//!
//! The notifier is fire-and-forget from the state machine's point of
//! view: delivery failures are returned for the caller to log, never
//! retried here. Retry policy, if any, belongs to the receiving end.
//!
//! # Components
//!
//! - **`severity`** — message severity and its wire color
//! - **`webhook`** — `WebhookNotifier`, HTTP POST of a JSON payload
//! - **`memory`** — `MemoryNotifier`, records sends for assertions

pub mod memory;
pub mod severity;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::{MemoryNotifier, SentMessage};
pub use severity::Severity;
pub use webhook::WebhookNotifier;

/// Result type alias for notification delivery.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("unexpected status: {0}")]
    Status(http::StatusCode),

    #[error("delivery timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Delivers a message with a severity color to a named channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: &str, message: &str, severity: Severity) -> NotifyResult<()>;
}
