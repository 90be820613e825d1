//! Per-namespace notification policy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotations::{ALERT_ANNOTATION, CHANNEL_ANNOTATION};

/// How chatty notifications for a namespace (or a single resource) are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Notify on start, success, and failure.
    #[default]
    All,
    /// Notify on failure only.
    FailureOnly,
}

impl AlertLevel {
    /// Parse the alert annotation value. Only the literal `failure`
    /// suppresses; anything else (including absent) means notify on all.
    pub fn from_annotation(value: Option<&str>) -> Self {
        match value {
            Some("failure") => AlertLevel::FailureOnly,
            _ => AlertLevel::All,
        }
    }
}

/// Notification policy for a namespace, sourced from its annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NamespacePolicy {
    /// Channel to notify. Empty means the namespace has opted out.
    pub channel: String,
    pub alert_level: AlertLevel,
}

impl NamespacePolicy {
    /// Derive a policy from a namespace's annotation map.
    pub fn from_annotations(annotations: &HashMap<String, String>) -> Self {
        Self {
            channel: annotations
                .get(CHANNEL_ANNOTATION)
                .cloned()
                .unwrap_or_default(),
            alert_level: AlertLevel::from_annotation(
                annotations.get(ALERT_ANNOTATION).map(String::as_str),
            ),
        }
    }

    /// Whether notifications are enabled at all for this namespace.
    pub fn notifications_enabled(&self) -> bool {
        !self.channel.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_from_annotations() {
        let mut annotations = HashMap::new();
        annotations.insert(CHANNEL_ANNOTATION.to_string(), "#deploys".to_string());
        annotations.insert(ALERT_ANNOTATION.to_string(), "failure".to_string());

        let policy = NamespacePolicy::from_annotations(&annotations);
        assert_eq!(policy.channel, "#deploys");
        assert_eq!(policy.alert_level, AlertLevel::FailureOnly);
        assert!(policy.notifications_enabled());
    }

    #[test]
    fn missing_annotations_mean_opted_out() {
        let policy = NamespacePolicy::from_annotations(&HashMap::new());
        assert!(!policy.notifications_enabled());
        assert_eq!(policy.alert_level, AlertLevel::All);
    }

    #[test]
    fn unknown_alert_value_means_all() {
        assert_eq!(AlertLevel::from_annotation(Some("verbose")), AlertLevel::All);
        assert_eq!(
            AlertLevel::from_annotation(Some("failure")),
            AlertLevel::FailureOnly
        );
    }
}
