//! Watch-stream event types.
//!
//! The orchestrator delivers full-object snapshots as newline-delimited
//! JSON. Update events carry both the previous and the current snapshot,
//! which is exactly what the state machine classifies. Resync deliveries
//! arrive as updates with identical resource versions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use herald_model::RolloutSnapshot;

use crate::error::{ClusterError, ClusterResult};

/// A decoded event from the watch stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatchEvent {
    RolloutAdded {
        object: RolloutSnapshot,
    },
    RolloutUpdated {
        old: RolloutSnapshot,
        new: RolloutSnapshot,
    },
    RolloutDeleted {
        object: RolloutSnapshot,
    },
    NamespaceUpdated {
        name: String,
        #[serde(default)]
        annotations: HashMap<String, String>,
    },
    NamespaceDeleted {
        name: String,
    },
}

/// Rollout lifecycle events, after namespace events are peeled off.
///
/// Add and delete carry snapshots for completeness, but only updates
/// drive classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    Added(RolloutSnapshot),
    Updated {
        old: RolloutSnapshot,
        new: RolloutSnapshot,
    },
    Deleted(RolloutSnapshot),
}

impl WatchEvent {
    /// Convert into a rollout event, if this is one.
    pub fn into_resource_event(self) -> Option<ResourceEvent> {
        match self {
            WatchEvent::RolloutAdded { object } => Some(ResourceEvent::Added(object)),
            WatchEvent::RolloutUpdated { old, new } => Some(ResourceEvent::Updated { old, new }),
            WatchEvent::RolloutDeleted { object } => Some(ResourceEvent::Deleted(object)),
            WatchEvent::NamespaceUpdated { .. } | WatchEvent::NamespaceDeleted { .. } => None,
        }
    }
}

/// Decode one NDJSON line from the watch stream.
pub fn decode_watch_line(line: &str) -> ClusterResult<WatchEvent> {
    serde_json::from_str(line).map_err(|e| ClusterError::Decode(e.to_string()))
}
