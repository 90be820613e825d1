//! heraldd — the herald daemon.
//!
//! Assembles the pieces:
//! - watch stream from the orchestrator API (NDJSON)
//! - namespace policy cache (fed by namespace events)
//! - rollout state machine + diagnostic aggregator
//! - webhook notifier
//!
//! # Usage
//!
//! ```text
//! heraldd --api-url http://orchestrator:8443/api/v1 \
//!         --webhook-url https://hooks.example.com/T000/B000 \
//!         --cluster-name west-1
//! ```

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use herald_cluster::{HttpCluster, PolicyCache, WatchEvent};
use herald_model::{DEFAULT_REPO_ANNOTATION, DEFAULT_SHA_ANNOTATION};
use herald_notify::WebhookNotifier;
use herald_watch::{RolloutWatcher, WatchConfig};

#[derive(Parser)]
#[command(name = "heraldd", about = "Rollout watcher and notifier")]
struct Cli {
    /// Base URL of the orchestrator API.
    #[arg(long, default_value = "http://127.0.0.1:8443/api/v1")]
    api_url: String,

    /// Webhook URL notifications are posted to.
    #[arg(long)]
    webhook_url: String,

    /// Cluster identity named in every notification.
    #[arg(long, env = "CLUSTER_NAME", default_value = "")]
    cluster_name: String,

    /// Annotation holding the source repository URL for a deployment.
    #[arg(long, default_value = DEFAULT_REPO_ANNOTATION)]
    repo_url_annotation: String,

    /// Annotation holding the commit SHA behind the latest rollout.
    #[arg(long, default_value = DEFAULT_SHA_ANNOTATION)]
    commit_sha_annotation: String,

    /// Warn in failure reports when the source-control annotations are missing.
    #[arg(long)]
    git_annotation_warning: bool,

    /// Condition reasons treated as terminal rollout failures.
    #[arg(long, default_values_t = [
        "ProgressDeadlineExceeded".to_string(),
        "FailedCreate".to_string(),
    ])]
    failure_reason: Vec<String>,

    /// Event channel capacity.
    #[arg(long, default_value = "256")]
    event_buffer: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,heraldd=debug,herald=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    info!("herald daemon starting");

    let config = WatchConfig {
        cluster_name: cli.cluster_name,
        repo_annotation: cli.repo_url_annotation,
        sha_annotation: cli.commit_sha_annotation,
        warn_missing_annotations: cli.git_annotation_warning,
        failure_reasons: cli.failure_reason,
    };

    let cluster = HttpCluster::new(&cli.api_url);
    let notifier = WebhookNotifier::new(&cli.webhook_url);
    let policies = PolicyCache::new();

    let watcher = RolloutWatcher::new(config, policies.clone(), cluster.clone(), notifier);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let stream_shutdown = shutdown_rx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install signal handler");
            return;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // ── Watch stream → policy cache + state machine ────────────

    let (raw_tx, mut raw_rx) = mpsc::channel::<WatchEvent>(cli.event_buffer);
    let (event_tx, event_rx) = mpsc::channel(cli.event_buffer);

    // Peel namespace events into the policy cache; forward the rest.
    let router_policies = policies.clone();
    let router = tokio::spawn(async move {
        while let Some(event) = raw_rx.recv().await {
            match event {
                WatchEvent::NamespaceUpdated { name, annotations } => {
                    router_policies.apply(&name, &annotations);
                }
                WatchEvent::NamespaceDeleted { name } => {
                    router_policies.remove(&name);
                }
                other => {
                    if let Some(resource_event) = other.into_resource_event() {
                        if event_tx.send(resource_event).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    let stream_cluster = cluster.clone();
    let stream = tokio::spawn(async move {
        if let Err(e) = stream_cluster.watch(raw_tx, stream_shutdown).await {
            warn!(error = %e, "watch stream terminated");
        }
    });

    info!(api = %cli.api_url, "rollout watcher running");
    watcher.run(event_rx, shutdown_rx).await;

    let _ = stream.await;
    let _ = router.await;

    info!("herald daemon stopped");
    Ok(())
}
