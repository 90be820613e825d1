//! Annotation keys herald reads and writes.
//!
//! The state annotation is the only key herald ever writes; everything
//! else is read-only input set by the orchestrator or by deploy tooling.

/// Persisted rollout phase, written by herald. Values: `progressing`,
/// `pass`, `fail`. Absent means the resource has never been classified.
pub const STATE_ANNOTATION: &str = "herald.dev/state";

/// Notification channel, set on the namespace. Empty or absent means the
/// namespace has opted out of notifications.
pub const CHANNEL_ANNOTATION: &str = "herald.dev/channel";

/// Alert verbosity, set on the namespace or overridden per resource.
/// `failure` suppresses non-failure notifications.
pub const ALERT_ANNOTATION: &str = "herald.dev/alert";

/// Revision marker bumped by the deployment controller each time a new
/// rollout template is applied. herald only compares values, never parses.
pub const REVISION_ANNOTATION: &str = "deployment.herald.dev/revision";

/// Default annotation key for the source repository URL.
pub const DEFAULT_REPO_ANNOTATION: &str = "herald.dev/gitrepo";

/// Default annotation key for the commit SHA behind the latest rollout.
pub const DEFAULT_SHA_ANNOTATION: &str = "herald.dev/gitsha";
