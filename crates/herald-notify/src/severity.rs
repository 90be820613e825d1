//! Message severity and its wire representation.

use serde::{Deserialize, Serialize};

/// Severity of a rollout notification.
///
/// Orange for "rolling out", green for "succeeded", red for "failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Orange,
    Green,
    Red,
}

impl Severity {
    /// Hex color sent in the webhook payload.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Orange => "#ff9900",
            Severity::Green => "#36a64f",
            Severity::Red => "#cc0000",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Orange => "orange",
            Severity::Green => "green",
            Severity::Red => "red",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_distinct() {
        assert_ne!(Severity::Orange.color(), Severity::Green.color());
        assert_ne!(Severity::Green.color(), Severity::Red.color());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Severity::Red).unwrap(), "\"red\"");
    }
}
