//! Read-only mirror of namespace notification policies.
//!
//! Populated exclusively by namespace watch events; the state machine only
//! ever reads it. Lookups are synchronous and cheap, so update callbacks
//! can resolve policy inline without awaiting.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use herald_model::NamespacePolicy;

/// Concurrent-read map of namespace name → notification policy.
#[derive(Clone, Default)]
pub struct PolicyCache {
    inner: Arc<RwLock<HashMap<String, NamespacePolicy>>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a namespace snapshot (add or update).
    pub fn apply(&self, namespace: &str, annotations: &HashMap<String, String>) {
        let policy = NamespacePolicy::from_annotations(annotations);
        debug!(%namespace, channel = %policy.channel, "namespace policy updated");
        self.inner
            .write()
            .expect("policy cache lock poisoned")
            .insert(namespace.to_string(), policy);
    }

    /// Drop a deleted namespace.
    pub fn remove(&self, namespace: &str) {
        self.inner
            .write()
            .expect("policy cache lock poisoned")
            .remove(namespace);
    }

    /// Resolve the policy for a namespace, if the mirror has seen it.
    pub fn lookup(&self, namespace: &str) -> Option<NamespacePolicy> {
        self.inner
            .read()
            .expect("policy cache lock poisoned")
            .get(namespace)
            .cloned()
    }
}
