//! herald-model — domain types for the herald rollout watcher.
//!
//! These are local mirrors of the orchestrator's deployment, replica set,
//! pod, and namespace objects, carrying only the fields herald reads. All
//! types are serializable to/from JSON — the wire format of the
//! orchestrator API and of test fixtures.
//!
//! The persisted rollout phase lives in an annotation on the watched
//! resource itself (`herald.dev/state`), so classification state survives
//! process restarts without any external storage.

pub mod annotations;
pub mod condition;
pub mod phase;
pub mod policy;
pub mod snapshot;

pub use annotations::*;
pub use condition::{Condition, ConditionStatus, latest_condition};
pub use phase::RolloutPhase;
pub use policy::{AlertLevel, NamespacePolicy};
pub use snapshot::{
    ContainerState, PodSnapshot, ReplicaSetSnapshot, RolloutSnapshot, WaitingState,
};
