//! HTTP implementation of `ClusterApi`.
//!
//! Talks JSON to the orchestrator's REST API:
//!
//! ```text
//! GET   {base}/namespaces/{ns}/replicasets?selector=k=v,...
//! GET   {base}/namespaces/{ns}/pods?selector=k=v,...
//! PATCH {base}/namespaces/{ns}/deployments/{name}   (merge annotations)
//! GET   {base}/watch                                (NDJSON event stream)
//! ```
//!
//! All bounded calls are wrapped in a request timeout; the watch stream
//! runs until the body ends or shutdown is signalled.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Buf, Bytes, BytesMut};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use herald_model::{PodSnapshot, ReplicaSetSnapshot, RolloutPhase, STATE_ANNOTATION};

use crate::api::ClusterApi;
use crate::error::{ClusterError, ClusterResult};
use crate::watch::{WatchEvent, decode_watch_line};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `ClusterApi` over the orchestrator's JSON REST API.
#[derive(Clone)]
pub struct HttpCluster {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    request_timeout: Duration,
}

impl HttpCluster {
    /// Create a client against the given base URL (e.g. `http://host:8443/api/v1`).
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, uri: &str) -> ClusterResult<T> {
        let req = http::Request::builder()
            .method("GET")
            .uri(uri)
            .header("accept", "application/json")
            .body(Full::new(Bytes::new()))
            .map_err(|e| ClusterError::Uri(e.to_string()))?;

        let resp = tokio::time::timeout(self.request_timeout, self.client.request(req))
            .await
            .map_err(|_| ClusterError::Timeout(self.request_timeout))?
            .map_err(|e| ClusterError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClusterError::Status(resp.status()));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ClusterError::Request(e.to_string()))?
            .to_bytes();
        serde_json::from_slice(&body).map_err(|e| ClusterError::Decode(e.to_string()))
    }

    /// Run the watch loop, forwarding decoded events to `tx`.
    ///
    /// Returns when the stream ends or shutdown is signalled. Undecodable
    /// lines are logged and skipped — one bad frame must not kill the
    /// subscription.
    pub async fn watch(
        &self,
        tx: mpsc::Sender<WatchEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ClusterResult<()> {
        let uri = format!("{}/watch", self.base_url);
        let req = http::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("accept", "application/x-ndjson")
            .body(Full::new(Bytes::new()))
            .map_err(|e| ClusterError::Uri(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| ClusterError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ClusterError::Status(resp.status()));
        }
        info!(%uri, "watch stream established");

        let mut body = resp.into_body();
        let mut buffer = BytesMut::new();

        loop {
            tokio::select! {
                frame = body.frame() => {
                    match frame {
                        Some(Ok(frame)) => {
                            if let Some(chunk) = frame.data_ref() {
                                buffer.extend_from_slice(chunk.chunk());
                                drain_lines(&mut buffer, &tx).await;
                            }
                        }
                        Some(Err(e)) => {
                            return Err(ClusterError::Request(e.to_string()));
                        }
                        None => {
                            debug!("watch stream ended");
                            return Ok(());
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("watch stream shutting down");
                    return Ok(());
                }
            }
        }
    }
}

/// Split complete NDJSON lines off the buffer and forward decoded events.
async fn drain_lines(buffer: &mut BytesMut, tx: &mpsc::Sender<WatchEvent>) {
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line = buffer.split_to(pos + 1);
        let line = String::from_utf8_lossy(&line[..pos]);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match decode_watch_line(line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    // Receiver gone — shutdown in progress.
                    return;
                }
            }
            Err(e) => warn!(error = %e, "skipping undecodable watch line"),
        }
    }
}

/// Render a label selector as a stable `k=v,...` query value.
fn format_selector(selector: &HashMap<String, String>) -> String {
    let mut pairs: Vec<String> = selector.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join(",")
}

#[async_trait]
impl ClusterApi for HttpCluster {
    async fn list_replica_sets(
        &self,
        namespace: &str,
        selector: &HashMap<String, String>,
    ) -> ClusterResult<Vec<ReplicaSetSnapshot>> {
        let uri = format!(
            "{}/namespaces/{namespace}/replicasets?selector={}",
            self.base_url,
            format_selector(selector)
        );
        self.get_json(&uri).await
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &HashMap<String, String>,
    ) -> ClusterResult<Vec<PodSnapshot>> {
        let uri = format!(
            "{}/namespaces/{namespace}/pods?selector={}",
            self.base_url,
            format_selector(selector)
        );
        self.get_json(&uri).await
    }

    async fn write_phase(
        &self,
        namespace: &str,
        name: &str,
        phase: RolloutPhase,
    ) -> ClusterResult<()> {
        let Some(value) = phase.as_annotation() else {
            // Nothing to record for an unclassified phase.
            return Ok(());
        };

        let patch = serde_json::json!({
            "annotations": { STATE_ANNOTATION: value }
        });
        let body = serde_json::to_vec(&patch).map_err(|e| ClusterError::Decode(e.to_string()))?;

        let uri = format!("{}/namespaces/{namespace}/deployments/{name}", self.base_url);
        let req = http::Request::builder()
            .method("PATCH")
            .uri(&uri)
            .header("content-type", "application/merge-patch+json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| ClusterError::Uri(e.to_string()))?;

        let resp = tokio::time::timeout(self.request_timeout, self.client.request(req))
            .await
            .map_err(|_| ClusterError::Timeout(self.request_timeout))?
            .map_err(|e| ClusterError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            error!(%namespace, %name, status = %resp.status(), "phase patch rejected");
            return Err(ClusterError::Status(resp.status()));
        }
        debug!(%namespace, %name, %phase, "phase annotation written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_format_is_sorted() {
        let mut selector = HashMap::new();
        selector.insert("tier".to_string(), "web".to_string());
        selector.insert("app".to_string(), "api".to_string());
        assert_eq!(format_selector(&selector), "app=api,tier=web");
        assert_eq!(format_selector(&HashMap::new()), "");
    }

    #[tokio::test]
    async fn list_against_closed_port_is_request_error() {
        let cluster = HttpCluster::new("http://127.0.0.1:1/api/v1")
            .with_request_timeout(Duration::from_millis(200));
        let result = cluster.list_pods("prod", &HashMap::new()).await;
        assert!(matches!(
            result,
            Err(ClusterError::Request(_)) | Err(ClusterError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn drain_lines_splits_and_skips_garbage() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(b"not json\n");
        buffer.extend_from_slice(
            b"{\"type\":\"namespace_deleted\",\"name\":\"prod\"}\npartial",
        );

        drain_lines(&mut buffer, &tx).await;

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, WatchEvent::NamespaceDeleted { name } if name == "prod"));
        assert!(rx.try_recv().is_err());
        // Incomplete tail stays buffered.
        assert_eq!(&buffer[..], b"partial");
    }
}
