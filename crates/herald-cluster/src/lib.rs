//! herald-cluster — the orchestration API boundary.
//!
//! Everything herald needs from the cluster sits behind the [`ClusterApi`]
//! trait: listing child replica sets and pods of a failed rollout, and
//! writing the persisted phase annotation back onto the watched resource.
//!
//! # Components
//!
//! - **`api`** — `ClusterApi` trait + `MemoryCluster` in-memory double
//! - **`http`** — `HttpCluster`, the JSON REST implementation
//! - **`policy`** — `PolicyCache`, read-only namespace policy mirror
//! - **`watch`** — watch-stream event types and NDJSON decoding

pub mod api;
pub mod error;
pub mod http;
pub mod policy;
pub mod watch;

pub use api::{ClusterApi, MemoryCluster};
pub use error::{ClusterError, ClusterResult};
pub use http::HttpCluster;
pub use policy::PolicyCache;
pub use watch::{ResourceEvent, WatchEvent, decode_watch_line};
