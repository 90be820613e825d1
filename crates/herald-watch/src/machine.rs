//! The rollout state machine.
//!
//! `on_update` classifies each (old, new) snapshot pair and drives at
//! most one phase write plus one notification per transition. The write
//! happens before the notify, so the persisted phase is durable even when
//! delivery fails; neither failure aborts the event loop.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use herald_cluster::{ClusterApi, PolicyCache, ResourceEvent};
use herald_model::{
    ALERT_ANNOTATION, AlertLevel, ConditionStatus, RolloutPhase, RolloutSnapshot,
    latest_condition,
};
use herald_notify::{Notifier, Severity};

use crate::config::WatchConfig;
use crate::diagnostics::build_report;

/// Watches rollout updates and converts transitions into durable state
/// and notifications.
pub struct RolloutWatcher<C, N> {
    config: WatchConfig,
    policies: PolicyCache,
    cluster: C,
    notifier: N,
}

impl<C: ClusterApi, N: Notifier> RolloutWatcher<C, N> {
    pub fn new(config: WatchConfig, policies: PolicyCache, cluster: C, notifier: N) -> Self {
        Self {
            config,
            policies,
            cluster,
            notifier,
        }
    }

    /// Dispatch a watch event. Adds and deletes carry no transition to
    /// classify; only updates matter.
    pub async fn handle(&self, event: ResourceEvent) {
        if let ResourceEvent::Updated { old, new } = event {
            self.on_update(&old, &new).await;
        }
    }

    /// Process events until the channel closes or shutdown is signalled.
    ///
    /// Events are handled strictly one at a time; a shutdown signal stops
    /// intake but never aborts the update already in flight.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<ResourceEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
        info!("rollout watcher stopped");
    }

    /// Classify an (old, new) snapshot pair.
    pub async fn on_update(&self, old: &RolloutSnapshot, new: &RolloutSnapshot) {
        // Resync deliveries re-send unchanged snapshots and must not
        // re-trigger anything. Progressing is the one phase allowed to
        // re-evaluate: a rollout can complete between resyncs without an
        // intervening update event.
        if old.resource_version == new.resource_version && new.phase() != RolloutPhase::Progressing
        {
            return;
        }

        let Some(policy) = self.policies.lookup(&new.namespace) else {
            debug!(namespace = %new.namespace, "namespace not in policy cache");
            return;
        };
        if !policy.notifications_enabled() {
            debug!(namespace = %new.namespace, "namespace has no notification channel");
            return;
        }
        let channel = &policy.channel;

        // The resource's own alert annotation overrides the namespace's.
        // An empty value counts as absent and falls back to the namespace.
        let alert_level = match new.annotations.get(ALERT_ANNOTATION) {
            Some(value) if !value.is_empty() => AlertLevel::from_annotation(Some(value)),
            _ => policy.alert_level,
        };

        // Rollout start: the revision marker moved.
        if old.revision() != new.revision() && new.phase() != RolloutPhase::Progressing {
            info!(resource = %new.key(), revision = %new.revision(), "rollout started");
            self.persist(new, RolloutPhase::Progressing).await;
            if alert_level != AlertLevel::FailureOnly {
                let message = format!(
                    "Rolling out Deployment `{}` in namespace `{}` on `{}` cluster.",
                    new.name, new.namespace, self.config.cluster_name,
                );
                self.notify(channel, &message, Severity::Orange).await;
            }
            return;
        }

        // Rollout success: latest condition healthy, spec fully
        // reconciled, every replica count converged on desired.
        if let Some(newest) = latest_condition(&new.conditions) {
            if newest.status == ConditionStatus::True
                && new.reconciled()
                && replicas_converged(new)
                && new.phase() != RolloutPhase::Pass
            {
                info!(resource = %new.key(), "rollout succeeded");
                self.persist(new, RolloutPhase::Pass).await;
                if alert_level != AlertLevel::FailureOnly {
                    let message = format!(
                        "Rollout for Deployment `{}` in `{}` namespace on `{}` cluster is successful.",
                        new.name, new.namespace, self.config.cluster_name,
                    );
                    self.notify(channel, &message, Severity::Green).await;
                }
                return;
            }
        }

        // Rollout failure: both snapshots reconciled against the same
        // generation (the failure reflects the current template), the
        // latest reason changed, and it changed to a terminal one.
        let (Some(newest), Some(previous)) = (
            latest_condition(&new.conditions),
            latest_condition(&old.conditions),
        ) else {
            return;
        };
        if new.reconciled()
            && old.reconciled()
            && new.generation == old.generation
            && newest.reason != previous.reason
            && self.config.is_failure_reason(&newest.reason)
            && new.phase() != RolloutPhase::Fail
        {
            info!(resource = %new.key(), reason = %newest.reason, "rollout failed");
            self.persist(new, RolloutPhase::Fail).await;

            let mut report = build_report(&self.cluster, &self.config, new).await;
            if let Some(block) = self.source_control_block(new) {
                report.push_str(&block);
            }
            info!(resource = %new.key(), "{report}");
            // Failure alerts are never suppressed by the alert level.
            self.notify(channel, &report, Severity::Red).await;
        }
    }

    /// Commit/PR deep-link block for a failure report, or a warning when
    /// the source-control annotations are missing and warnings are on.
    fn source_control_block(&self, resource: &RolloutSnapshot) -> Option<String> {
        let repo = resource.annotations.get(&self.config.repo_annotation);
        let sha = resource.annotations.get(&self.config.sha_annotation);
        match (repo, sha) {
            (Some(repo), Some(sha)) => Some(format!(
                "\n\nRolled out from commit {}/commit/{sha}",
                repo.trim_end_matches('/'),
            )),
            _ if self.config.warn_missing_annotations => Some(format!(
                "\n\nSource-control annotations `{}` and `{}` are not set on this Deployment.",
                self.config.repo_annotation, self.config.sha_annotation,
            )),
            _ => None,
        }
    }

    /// Persist the phase. Failures are logged; the notification still
    /// goes out because persistence and delivery are independent.
    async fn persist(&self, resource: &RolloutSnapshot, phase: RolloutPhase) {
        if let Err(e) = self
            .cluster
            .write_phase(&resource.namespace, &resource.name, phase)
            .await
        {
            error!(resource = %resource.key(), %phase, error = %e, "failed to persist rollout phase");
        }
    }

    /// Send a notification. Failures are logged; the persisted phase is
    /// the source of truth and is never rolled back.
    async fn notify(&self, channel: &str, message: &str, severity: Severity) {
        if let Err(e) = self.notifier.send(channel, message, severity).await {
            error!(%channel, error = %e, "failed to send notification");
        }
    }
}

/// All three live replica counts equal to each other and to desired.
fn replicas_converged(resource: &RolloutSnapshot) -> bool {
    resource.replicas == resource.ready_replicas
        && resource.updated_replicas == resource.ready_replicas
        && resource.desired_replicas == resource.ready_replicas
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use herald_cluster::MemoryCluster;
    use herald_model::{
        CHANNEL_ANNOTATION, Condition, ContainerState, PodSnapshot, REVISION_ANNOTATION,
        ReplicaSetSnapshot, STATE_ANNOTATION, WaitingState,
    };
    use herald_notify::MemoryNotifier;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn condition(reason: &str, status: ConditionStatus, ts: u64) -> Condition {
        Condition {
            reason: reason.to_string(),
            message: format!("{reason} message"),
            status,
            last_transition: ts,
        }
    }

    fn snapshot(version: &str, annotations: &[(&str, &str)]) -> RolloutSnapshot {
        RolloutSnapshot {
            name: "api".to_string(),
            namespace: "prod".to_string(),
            resource_version: version.to_string(),
            generation: 2,
            observed_generation: 2,
            desired_replicas: 3,
            replicas: 3,
            ready_replicas: 3,
            updated_replicas: 3,
            progress_deadline_secs: 600,
            selector: map(&[("app", "api")]),
            annotations: map(annotations),
            conditions: Vec::new(),
        }
    }

    fn watcher_with(
        config: WatchConfig,
    ) -> (RolloutWatcher<MemoryCluster, MemoryNotifier>, MemoryCluster, MemoryNotifier) {
        let policies = PolicyCache::new();
        policies.apply("prod", &map(&[(CHANNEL_ANNOTATION, "#deploys")]));
        let cluster = MemoryCluster::new();
        let notifier = MemoryNotifier::new();
        let watcher = RolloutWatcher::new(config, policies, cluster.clone(), notifier.clone());
        (watcher, cluster, notifier)
    }

    fn watcher() -> (RolloutWatcher<MemoryCluster, MemoryNotifier>, MemoryCluster, MemoryNotifier)
    {
        watcher_with(WatchConfig {
            cluster_name: "west-1".to_string(),
            ..Default::default()
        })
    }

    fn seed_failed_children(cluster: &MemoryCluster) {
        cluster.add_replica_set(ReplicaSetSnapshot {
            name: "api-7d9c".to_string(),
            namespace: "prod".to_string(),
            labels: map(&[("app", "api"), ("hash", "7d9c")]),
            annotations: map(&[(REVISION_ANNOTATION, "2")]),
            conditions: Vec::new(),
        });
        cluster.add_pod(PodSnapshot {
            name: "api-7d9c-1".to_string(),
            namespace: "prod".to_string(),
            labels: map(&[("app", "api"), ("hash", "7d9c")]),
            init_container_states: Vec::new(),
            container_states: vec![ContainerState {
                name: "main".to_string(),
                waiting: Some(WaitingState {
                    reason: "CrashLoopBackOff".to_string(),
                    message: "boom".to_string(),
                }),
            }],
            conditions: Vec::new(),
        });
    }

    /// Scenario A: revision bump from "1" to "2" with no persisted phase.
    #[tokio::test]
    async fn revision_change_starts_rollout() {
        let (watcher, cluster, notifier) = watcher();
        let old = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);

        watcher.on_update(&old, &new).await;

        assert_eq!(
            cluster.phase_writes(),
            vec![("prod".to_string(), "api".to_string(), RolloutPhase::Progressing)]
        );
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Orange);
        assert!(sent[0].message.contains("`api`"));
        assert!(sent[0].message.contains("`prod`"));
        assert!(sent[0].message.contains("`west-1`"));
    }

    /// Scenario B: converged replicas, reconciled, healthy latest condition.
    #[tokio::test]
    async fn converged_rollout_passes() {
        let (watcher, cluster, notifier) = watcher();
        let mut old = snapshot("10", &[(STATE_ANNOTATION, "progressing")]);
        old.ready_replicas = 2;
        let mut new = snapshot("11", &[(STATE_ANNOTATION, "progressing")]);
        new.conditions = vec![condition("NewReplicaSetAvailable", ConditionStatus::True, 100)];

        watcher.on_update(&old, &new).await;

        assert_eq!(
            cluster.phase_writes(),
            vec![("prod".to_string(), "api".to_string(), RolloutPhase::Pass)]
        );
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Green);
        assert!(sent[0].message.contains("successful"));
    }

    #[tokio::test]
    async fn terminal_reason_fails_rollout_with_report() {
        let (watcher, cluster, notifier) = watcher();
        seed_failed_children(&cluster);

        let mut old = snapshot("10", &[
            (STATE_ANNOTATION, "progressing"),
            (REVISION_ANNOTATION, "2"),
        ]);
        old.conditions = vec![condition("ReplicaSetUpdated", ConditionStatus::True, 100)];
        let mut new = old.clone();
        new.resource_version = "11".to_string();
        new.conditions = vec![
            condition("ReplicaSetUpdated", ConditionStatus::True, 100),
            condition("ProgressDeadlineExceeded", ConditionStatus::False, 200),
        ];

        watcher.on_update(&old, &new).await;

        assert_eq!(
            cluster.phase_writes(),
            vec![("prod".to_string(), "api".to_string(), RolloutPhase::Fail)]
        );
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Red);
        assert!(sent[0].message.contains("* CrashLoopBackOff - boom"));
    }

    /// Idempotence: a second delivery of the same pair is a no-op once
    /// the persisted phase matches.
    #[tokio::test]
    async fn duplicate_delivery_is_idempotent() {
        let (watcher, cluster, notifier) = watcher();
        let old = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);

        watcher.on_update(&old, &new).await;

        // Redelivery after the phase write landed on the resource.
        let mut old_redelivered = old.clone();
        old_redelivered
            .annotations
            .insert(STATE_ANNOTATION.to_string(), "progressing".to_string());
        old_redelivered
            .annotations
            .insert(REVISION_ANNOTATION.to_string(), "2".to_string());
        let mut new_redelivered = new.clone();
        new_redelivered
            .annotations
            .insert(STATE_ANNOTATION.to_string(), "progressing".to_string());

        watcher.on_update(&old_redelivered, &new_redelivered).await;

        assert_eq!(cluster.phase_writes().len(), 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn resync_delivery_is_filtered() {
        let (watcher, cluster, notifier) = watcher();
        // Identical resource versions, terminal phase — classic resync.
        let snap = snapshot("10", &[(STATE_ANNOTATION, "pass")]);

        watcher.on_update(&snap, &snap.clone()).await;

        assert!(cluster.phase_writes().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn resync_with_progressing_phase_may_complete() {
        let (watcher, cluster, notifier) = watcher();
        let mut snap = snapshot("10", &[(STATE_ANNOTATION, "progressing")]);
        snap.conditions = vec![condition("NewReplicaSetAvailable", ConditionStatus::True, 100)];

        // Same resource version on both sides, but progressing re-evaluates
        // and the snapshot shows a completed rollout.
        watcher.on_update(&snap.clone(), &snap).await;

        assert_eq!(
            cluster.phase_writes(),
            vec![("prod".to_string(), "api".to_string(), RolloutPhase::Pass)]
        );
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn namespace_without_channel_is_silent() {
        let (watcher, cluster, notifier) = watcher();
        watcher.policies.apply("prod", &HashMap::new());

        let old = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);
        watcher.on_update(&old, &new).await;

        assert!(cluster.phase_writes().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_namespace_is_silent() {
        let (watcher, cluster, notifier) = watcher();
        let mut old = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        old.namespace = "unseen".to_string();
        let mut new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);
        new.namespace = "unseen".to_string();

        watcher.on_update(&old, &new).await;

        assert!(cluster.phase_writes().is_empty());
        assert!(notifier.sent().is_empty());
    }

    /// Failure-only suppression skips the send but never the phase write.
    #[tokio::test]
    async fn failure_only_suppresses_notify_not_persistence() {
        let (watcher, cluster, notifier) = watcher();
        let old = snapshot("10", &[(REVISION_ANNOTATION, "1"), (ALERT_ANNOTATION, "failure")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2"), (ALERT_ANNOTATION, "failure")]);

        watcher.on_update(&old, &new).await;

        assert_eq!(
            cluster.phase_writes(),
            vec![("prod".to_string(), "api".to_string(), RolloutPhase::Progressing)]
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_alert_annotation_falls_back_to_namespace_policy() {
        let (watcher, cluster, notifier) = watcher();
        watcher.policies.apply(
            "prod",
            &map(&[(CHANNEL_ANNOTATION, "#deploys"), (ALERT_ANNOTATION, "failure")]),
        );

        // The resource carries the alert annotation with an empty value;
        // the namespace's failure-only policy must still apply.
        let old = snapshot("10", &[(REVISION_ANNOTATION, "1"), (ALERT_ANNOTATION, "")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2"), (ALERT_ANNOTATION, "")]);

        watcher.on_update(&old, &new).await;

        assert_eq!(
            cluster.phase_writes(),
            vec![("prod".to_string(), "api".to_string(), RolloutPhase::Progressing)]
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failure_alerts_ignore_suppression() {
        let (watcher, cluster, notifier) = watcher();
        seed_failed_children(&cluster);

        let mut old = snapshot("10", &[
            (STATE_ANNOTATION, "progressing"),
            (REVISION_ANNOTATION, "2"),
            (ALERT_ANNOTATION, "failure"),
        ]);
        old.conditions = vec![condition("ReplicaSetUpdated", ConditionStatus::True, 100)];
        let mut new = old.clone();
        new.resource_version = "11".to_string();
        new.conditions.push(condition("FailedCreate", ConditionStatus::False, 200));

        watcher.on_update(&old, &new).await;

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.sent()[0].severity, Severity::Red);
    }

    #[tokio::test]
    async fn persistence_failure_still_notifies() {
        let (watcher, cluster, notifier) = watcher();
        cluster.fail_writes();

        let old = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);
        watcher.on_update(&old, &new).await;

        assert!(cluster.phase_writes().is_empty());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn notification_failure_does_not_roll_back_phase() {
        let (watcher, cluster, notifier) = watcher();
        notifier.fail_sends();

        let old = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);
        watcher.on_update(&old, &new).await;

        assert_eq!(cluster.phase_writes().len(), 1);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_condition_lists_are_skipped() {
        let (watcher, cluster, notifier) = watcher();
        // Same revision, no conditions anywhere: nothing to classify.
        let old = snapshot("10", &[(REVISION_ANNOTATION, "2")]);
        let new = snapshot("11", &[(REVISION_ANNOTATION, "2")]);

        watcher.on_update(&old, &new).await;

        assert!(cluster.phase_writes().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn pending_spec_change_defers_failure() {
        let (watcher, cluster, notifier) = watcher();
        seed_failed_children(&cluster);

        let mut old = snapshot("10", &[
            (STATE_ANNOTATION, "progressing"),
            (REVISION_ANNOTATION, "2"),
        ]);
        old.conditions = vec![condition("ReplicaSetUpdated", ConditionStatus::True, 100)];
        let mut new = old.clone();
        new.resource_version = "11".to_string();
        // A new spec edit is pending — this failure belongs to a stale template.
        new.generation = 3;
        new.conditions.push(condition("ProgressDeadlineExceeded", ConditionStatus::False, 200));

        watcher.on_update(&old, &new).await;

        assert!(cluster.phase_writes().is_empty());
        assert!(notifier.sent().is_empty());
    }

    /// Scenario E, all three variants.
    #[test]
    fn source_control_block_variants() {
        let config = WatchConfig {
            cluster_name: "west-1".to_string(),
            ..Default::default()
        };
        let (watcher, _, _) = watcher_with(config.clone());

        let with_annotations = snapshot("10", &[
            ("herald.dev/gitrepo", "https://git.example.com/team/api"),
            ("herald.dev/gitsha", "abc123"),
        ]);
        let block = watcher.source_control_block(&with_annotations).unwrap();
        assert!(block.contains("https://git.example.com/team/api/commit/abc123"));

        let without = snapshot("10", &[]);
        assert!(watcher.source_control_block(&without).is_none());

        let (warning_watcher, _, _) = watcher_with(WatchConfig {
            warn_missing_annotations: true,
            ..config
        });
        let warning = warning_watcher.source_control_block(&without).unwrap();
        assert!(warning.contains("`herald.dev/gitrepo`"));
        assert!(warning.contains("`herald.dev/gitsha`"));
    }

    #[tokio::test]
    async fn failure_report_carries_commit_link() {
        let (watcher, cluster, notifier) = watcher();
        seed_failed_children(&cluster);

        let mut old = snapshot("10", &[
            (STATE_ANNOTATION, "progressing"),
            (REVISION_ANNOTATION, "2"),
            ("herald.dev/gitrepo", "https://git.example.com/team/api"),
            ("herald.dev/gitsha", "abc123"),
        ]);
        old.conditions = vec![condition("ReplicaSetUpdated", ConditionStatus::True, 100)];
        let mut new = old.clone();
        new.resource_version = "11".to_string();
        new.conditions.push(condition("ProgressDeadlineExceeded", ConditionStatus::False, 200));

        watcher.on_update(&old, &new).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].message.contains("/commit/abc123"));
    }

    /// Monotonic phase: a full lifecycle produces none → progressing →
    /// pass, and a later revision re-arms the cycle.
    #[tokio::test]
    async fn phase_sequence_across_lifecycle() {
        let (watcher, cluster, notifier) = watcher();

        // Start: revision 1 → 2.
        let v1 = snapshot("10", &[(REVISION_ANNOTATION, "1")]);
        let v2 = snapshot("11", &[(REVISION_ANNOTATION, "2")]);
        watcher.on_update(&v1, &v2).await;

        // Complete: progressing snapshot converges.
        let mut progressing = snapshot("12", &[
            (REVISION_ANNOTATION, "2"),
            (STATE_ANNOTATION, "progressing"),
        ]);
        progressing.conditions =
            vec![condition("NewReplicaSetAvailable", ConditionStatus::True, 100)];
        watcher.on_update(&v2, &progressing).await;

        // A fresh revision restarts the cycle.
        let mut passed = progressing.clone();
        passed
            .annotations
            .insert(STATE_ANNOTATION.to_string(), "pass".to_string());
        let mut v3 = passed.clone();
        v3.resource_version = "13".to_string();
        v3.annotations
            .insert(REVISION_ANNOTATION.to_string(), "3".to_string());
        watcher.on_update(&passed, &v3).await;

        let phases: Vec<RolloutPhase> =
            cluster.phase_writes().into_iter().map(|(_, _, p)| p).collect();
        assert_eq!(
            phases,
            vec![
                RolloutPhase::Progressing,
                RolloutPhase::Pass,
                RolloutPhase::Progressing,
            ]
        );
        assert_eq!(notifier.sent().len(), 3);
    }

    #[tokio::test]
    async fn run_drains_events_then_stops_on_shutdown() {
        let (watcher, cluster, _) = watcher();
        let (tx, rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(ResourceEvent::Updated {
            old: snapshot("10", &[(REVISION_ANNOTATION, "1")]),
            new: snapshot("11", &[(REVISION_ANNOTATION, "2")]),
        })
        .await
        .unwrap();
        // Adds and deletes are ignored by dispatch.
        tx.send(ResourceEvent::Added(snapshot("12", &[]))).await.unwrap();

        let handle = tokio::spawn(async move { watcher.run(rx, shutdown_rx).await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(cluster.phase_writes().len(), 1);
    }
}
