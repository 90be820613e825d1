//! Watcher configuration.
//!
//! Plain values owned by the daemon's bootstrap and handed in once at
//! construction. The watcher never re-reads configuration at runtime.

use herald_model::{DEFAULT_REPO_ANNOTATION, DEFAULT_SHA_ANNOTATION};

/// Configuration for the rollout watcher.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Cluster identity named in every notification.
    pub cluster_name: String,
    /// Annotation key holding the source repository URL.
    pub repo_annotation: String,
    /// Annotation key holding the commit SHA behind the latest rollout.
    pub sha_annotation: String,
    /// Append a warning to failure reports when the source-control
    /// annotations are missing.
    pub warn_missing_annotations: bool,
    /// Condition reasons that mark a rollout as terminally failed.
    pub failure_reasons: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            cluster_name: String::new(),
            repo_annotation: DEFAULT_REPO_ANNOTATION.to_string(),
            sha_annotation: DEFAULT_SHA_ANNOTATION.to_string(),
            warn_missing_annotations: false,
            failure_reasons: vec![
                "ProgressDeadlineExceeded".to_string(),
                "FailedCreate".to_string(),
            ],
        }
    }
}

impl WatchConfig {
    /// Whether a condition reason terminally fails a rollout.
    pub fn is_failure_reason(&self, reason: &str) -> bool {
        self.failure_reasons.iter().any(|r| r == reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_failure_reasons() {
        let config = WatchConfig::default();
        assert!(config.is_failure_reason("ProgressDeadlineExceeded"));
        assert!(config.is_failure_reason("FailedCreate"));
        assert!(!config.is_failure_reason("NewReplicaSetAvailable"));
    }
}
