//! Timestamped status conditions and their ordering.

use serde::{Deserialize, Serialize};

/// Tri-state condition status as reported by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// A single timestamped condition on a rollout, replica set, or pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub reason: String,
    pub message: String,
    pub status: ConditionStatus,
    /// Unix timestamp (milliseconds) of the last status transition.
    pub last_transition: u64,
}

/// Return the most recently transitioned condition.
///
/// The sort is stable: conditions sharing a timestamp keep their original
/// relative order, so "most recent" is well-defined even with duplicate
/// timestamps. Returns `None` for an empty list — callers must treat that
/// as "no classification possible" rather than indexing blindly.
pub fn latest_condition(conditions: &[Condition]) -> Option<&Condition> {
    let mut order: Vec<usize> = (0..conditions.len()).collect();
    order.sort_by_key(|&i| conditions[i].last_transition);
    order.last().map(|&i| &conditions[i])
}
