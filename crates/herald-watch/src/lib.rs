//! herald-watch — the rollout state machine and diagnostic aggregator.
//!
//! Classifies each (old, new) snapshot pair delivered by the watch stream
//! into one of: no-op, rollout started, rollout succeeded, rollout failed.
//! Each transition is persisted exactly once as an annotation on the
//! watched resource and produces at most one notification.
//!
//! ```text
//! none → progressing → {pass, fail}
//! ```
//!
//! `pass` and `fail` are sticky per revision; a revision change re-arms
//! the cycle. Phase-equality checks make every write idempotent, so
//! duplicate and resync deliveries are safe.
//!
//! # Components
//!
//! - **`config`** — `WatchConfig`, plain values handed in at startup
//! - **`machine`** — `RolloutWatcher`, classification and the event loop
//! - **`diagnostics`** — `build_report`, deterministic failure reports

pub mod config;
pub mod diagnostics;
pub mod machine;

pub use config::WatchConfig;
pub use diagnostics::build_report;
pub use machine::RolloutWatcher;
