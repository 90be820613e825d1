//! The `ClusterApi` trait and its in-memory test double.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use herald_model::{PodSnapshot, ReplicaSetSnapshot, RolloutPhase};

use crate::error::{ClusterError, ClusterResult};

/// Operations herald performs against the orchestrator API.
///
/// Listing is read-only; `write_phase` is the single mutation herald ever
/// makes, a merge-style patch touching only the state annotation.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List replica sets in a namespace matching the given labels.
    async fn list_replica_sets(
        &self,
        namespace: &str,
        selector: &HashMap<String, String>,
    ) -> ClusterResult<Vec<ReplicaSetSnapshot>>;

    /// List pods in a namespace matching the given labels.
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &HashMap<String, String>,
    ) -> ClusterResult<Vec<PodSnapshot>>;

    /// Record the rollout phase on the watched resource. Must not clobber
    /// any other annotation.
    async fn write_phase(
        &self,
        namespace: &str,
        name: &str,
        phase: RolloutPhase,
    ) -> ClusterResult<()>;
}

/// Whether every `(key, value)` of `selector` is present in `labels`.
pub(crate) fn selector_matches(
    selector: &HashMap<String, String>,
    labels: &HashMap<String, String>,
) -> bool {
    selector
        .iter()
        .all(|(k, v)| labels.get(k).is_some_and(|lv| lv == v))
}

/// In-memory `ClusterApi` for tests.
///
/// Seeded with replica sets and pods; records every phase write so tests
/// can assert on idempotence. Writes can be forced to fail to exercise
/// the persistence-error path.
#[derive(Clone, Default)]
pub struct MemoryCluster {
    inner: Arc<Mutex<MemoryClusterInner>>,
}

#[derive(Default)]
struct MemoryClusterInner {
    replica_sets: Vec<ReplicaSetSnapshot>,
    pods: Vec<PodSnapshot>,
    phase_writes: Vec<(String, String, RolloutPhase)>,
    fail_writes: bool,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_replica_set(&self, rs: ReplicaSetSnapshot) {
        self.inner.lock().unwrap().replica_sets.push(rs);
    }

    pub fn add_pod(&self, pod: PodSnapshot) {
        self.inner.lock().unwrap().pods.push(pod);
    }

    /// Make subsequent `write_phase` calls fail.
    pub fn fail_writes(&self) {
        self.inner.lock().unwrap().fail_writes = true;
    }

    /// Phase writes recorded so far, as `(namespace, name, phase)`.
    pub fn phase_writes(&self) -> Vec<(String, String, RolloutPhase)> {
        self.inner.lock().unwrap().phase_writes.clone()
    }
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    async fn list_replica_sets(
        &self,
        namespace: &str,
        selector: &HashMap<String, String>,
    ) -> ClusterResult<Vec<ReplicaSetSnapshot>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .replica_sets
            .iter()
            .filter(|rs| rs.namespace == namespace && selector_matches(selector, &rs.labels))
            .cloned()
            .collect())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &HashMap<String, String>,
    ) -> ClusterResult<Vec<PodSnapshot>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .pods
            .iter()
            .filter(|pod| pod.namespace == namespace && selector_matches(selector, &pod.labels))
            .cloned()
            .collect())
    }

    async fn write_phase(
        &self,
        namespace: &str,
        name: &str,
        phase: RolloutPhase,
    ) -> ClusterResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(ClusterError::Request("write rejected".to_string()));
        }
        inner
            .phase_writes
            .push((namespace.to_string(), name.to_string(), phase));
        Ok(())
    }
}
