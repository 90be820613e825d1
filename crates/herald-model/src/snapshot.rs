//! Snapshot types for watched resources.
//!
//! Full-object snapshots delivered by the watch stream. Only the fields
//! herald reads are mirrored; everything else stays on the orchestrator
//! side.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotations::{REVISION_ANNOTATION, STATE_ANNOTATION};
use crate::condition::Condition;
use crate::phase::RolloutPhase;

/// Snapshot of a watched deployment-like resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutSnapshot {
    pub name: String,
    pub namespace: String,
    /// Opaque version marker, bumped by the orchestrator on every write.
    /// Identical versions on an (old, new) pair mean a resync delivery.
    pub resource_version: String,
    /// Spec-change counter, bumped on every spec edit.
    pub generation: i64,
    /// Last generation the controller reconciled. Equality with
    /// `generation` means "fully reconciled".
    pub observed_generation: i64,
    pub desired_replicas: i32,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub updated_replicas: i32,
    /// Seconds the controller waits for progress before reporting failure.
    pub progress_deadline_secs: i64,
    /// Pod-template labels, used to find the owning replica sets.
    #[serde(default)]
    pub selector: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl RolloutSnapshot {
    /// The persisted rollout phase recorded on this snapshot.
    pub fn phase(&self) -> RolloutPhase {
        RolloutPhase::from_annotation(self.annotations.get(STATE_ANNOTATION).map(String::as_str))
    }

    /// The revision marker, or empty if the controller has not set one.
    pub fn revision(&self) -> &str {
        self.annotations
            .get(REVISION_ANNOTATION)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Composite `{namespace}/{name}` identity.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Whether the controller has caught up with the latest spec.
    pub fn reconciled(&self) -> bool {
        self.generation == self.observed_generation
    }
}

/// Snapshot of a replica set owned by a rollout resource.
///
/// The owning relationship is established by a matching revision
/// annotation, not by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSetSnapshot {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// Used only when the replica set has zero live pods, e.g. an
    /// admission-time rejection before any pod was created.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ReplicaSetSnapshot {
    pub fn revision(&self) -> &str {
        self.annotations
            .get(REVISION_ANNOTATION)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Waiting state of a container that has not started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingState {
    pub reason: String,
    pub message: String,
}

/// State of a single container within a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContainerState {
    pub name: String,
    /// Present while the container is waiting to start; absent once it
    /// is running or terminated.
    #[serde(default)]
    pub waiting: Option<WaitingState>,
}

/// Snapshot of a pod owned by a replica set (via label selector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub init_container_states: Vec<ContainerState>,
    #[serde(default)]
    pub container_states: Vec<ContainerState>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}
