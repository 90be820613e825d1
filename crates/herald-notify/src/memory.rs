//! In-memory notifier for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::severity::Severity;
use crate::{Notifier, NotifyError, NotifyResult};

/// A message captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: String,
    pub message: String,
    pub severity: Severity,
}

/// Records every send; can be forced to fail to exercise the
/// notification-error path.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    inner: Arc<Mutex<MemoryNotifierInner>>,
}

#[derive(Default)]
struct MemoryNotifierInner {
    sent: Vec<SentMessage>,
    fail_sends: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail.
    pub fn fail_sends(&self) {
        self.inner.lock().unwrap().fail_sends = true;
    }

    /// Messages captured so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.inner.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, channel: &str, message: &str, severity: Severity) -> NotifyResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_sends {
            return Err(NotifyError::Delivery("send rejected".to_string()));
        }
        inner.sent.push(SentMessage {
            channel: channel.to_string(),
            message: message.to_string(),
            severity,
        });
        Ok(())
    }
}
