//! The persisted rollout phase.

use serde::{Deserialize, Serialize};

/// Classification of a rollout, persisted in the state annotation.
///
/// Transitions follow `none → progressing → {pass, fail}`; `pass` and
/// `fail` are sticky per revision and are re-armed only by a revision
/// change (which moves the phase back to `progressing`). Re-applying the
/// current phase is a no-op, which makes every transition idempotent
/// under duplicate event delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RolloutPhase {
    /// Never classified — the state annotation is absent.
    #[default]
    None,
    Progressing,
    Pass,
    Fail,
}

impl RolloutPhase {
    /// Annotation value for this phase. `None` is represented by the
    /// absence of the annotation and has no value.
    pub fn as_annotation(&self) -> Option<&'static str> {
        match self {
            RolloutPhase::None => None,
            RolloutPhase::Progressing => Some("progressing"),
            RolloutPhase::Pass => Some("pass"),
            RolloutPhase::Fail => Some("fail"),
        }
    }

    /// Parse an annotation value. Absent or unrecognized values map to
    /// `None` — an unknown marker must not wedge classification.
    pub fn from_annotation(value: Option<&str>) -> Self {
        match value {
            Some("progressing") => RolloutPhase::Progressing,
            Some("pass") => RolloutPhase::Pass,
            Some("fail") => RolloutPhase::Fail,
            _ => RolloutPhase::None,
        }
    }
}

impl std::fmt::Display for RolloutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_annotation().unwrap_or("none"))
    }
}
