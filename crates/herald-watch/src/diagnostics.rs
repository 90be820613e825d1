//! Diagnostic aggregation for failed rollouts.
//!
//! Walks the failed resource's child replica set and pods and renders one
//! deduplicated, deterministically ordered report. The same report feeds
//! both a log line and the user-facing alert, so the output must be
//! byte-identical for identical inputs.

use std::collections::BTreeMap;

use tracing::warn;

use herald_cluster::ClusterApi;
use herald_model::{
    Condition, ConditionStatus, ContainerState, ReplicaSetSnapshot, RolloutSnapshot,
    latest_condition,
};

use crate::config::WatchConfig;

/// Transient reason while a container image is being pulled and started.
/// Not an error, always skipped.
const CONTAINER_CREATING: &str = "ContainerCreating";

/// Build a human-readable report explaining why a rollout failed.
///
/// Lookup failures degrade to an explicit message rather than erroring:
/// a failed rollout must always produce something the operator can read.
pub async fn build_report<C: ClusterApi>(
    cluster: &C,
    config: &WatchConfig,
    resource: &RolloutSnapshot,
) -> String {
    let rs = match find_replica_set(cluster, resource).await {
        Ok(Some(rs)) => rs,
        Ok(None) => {
            return format!(
                "Rollout for Deployment `{}` in `{}` namespace failed on the `{}` cluster. \
                 No replica set found for revision `{}`.",
                resource.name,
                resource.namespace,
                config.cluster_name,
                resource.revision(),
            );
        }
        Err(e) => {
            warn!(resource = %resource.key(), error = %e, "failed to list replica sets");
            return format!(
                "Rollout for Deployment `{}` in `{}` namespace failed on the `{}` cluster. \
                 Could not retrieve its replica sets: {e}.",
                resource.name, resource.namespace, config.cluster_name,
            );
        }
    };

    let pods = match cluster.list_pods(&resource.namespace, &rs.labels).await {
        Ok(pods) => pods,
        Err(e) => {
            warn!(resource = %resource.key(), error = %e, "failed to list pods");
            return format!(
                "Rollout for Deployment `{}` (RS: `{}`) in `{}` namespace failed on the `{}` \
                 cluster. Could not retrieve its pods: {e}.",
                resource.name, rs.name, resource.namespace, config.cluster_name,
            );
        }
    };

    let mut error_lines = Vec::new();

    if pods.is_empty() {
        // Admission-time failure: the replica set never created a pod, so
        // its own latest condition carries the explanation.
        if let Some(condition) = latest_condition(&rs.conditions) {
            error_lines.push(format!("```{}```", condition.message));
        }
    } else {
        // reason → message, deduplicated; BTreeMap iteration is
        // lexicographic, which pins the output order.
        let mut reasons: BTreeMap<String, String> = BTreeMap::new();
        for pod in &pods {
            collect_waiting_states(&pod.init_container_states, &mut reasons);
            collect_waiting_states(&pod.container_states, &mut reasons);
            collect_pod_conditions(&pod.conditions, &mut reasons);
        }
        for (reason, message) in &reasons {
            error_lines.push(format!("```\n* {reason} - {message}\n```"));
        }
    }

    if error_lines.is_empty() {
        // Deadline elapsed without any concrete container error: the
        // rollout is simply too slow.
        return format!(
            "*Deployment `{}` (RS: `{}`) in `{}` namespace failed to reach desired replicas \
             within `{}` seconds on the `{}` cluster, only `{}/{}` replicas are ready.*\n",
            resource.name,
            rs.name,
            resource.namespace,
            resource.progress_deadline_secs,
            config.cluster_name,
            resource.ready_replicas,
            resource.desired_replicas,
        );
    }

    let mut report = vec![format!(
        "*Rollout for Deployment `{}` (RS: `{}`) in `{}` namespace failed after `{}` seconds \
         on the `{}` cluster.*\n\n*Retrieved the following errors:*",
        resource.name,
        rs.name,
        resource.namespace,
        resource.progress_deadline_secs,
        config.cluster_name,
    )];
    report.extend(error_lines);
    report.join("\n")
}

/// Find the replica set owning the resource's current revision.
///
/// Candidates are matched by the resource's pod-template labels, then
/// narrowed to the one whose revision annotation equals the resource's.
async fn find_replica_set<C: ClusterApi>(
    cluster: &C,
    resource: &RolloutSnapshot,
) -> Result<Option<ReplicaSetSnapshot>, herald_cluster::ClusterError> {
    let candidates = cluster
        .list_replica_sets(&resource.namespace, &resource.selector)
        .await?;
    Ok(candidates
        .into_iter()
        .find(|rs| rs.revision() == resource.revision()))
}

/// Collect waiting reasons from container states, skipping the transient
/// "still being created" reason. Last writer per reason wins.
fn collect_waiting_states(states: &[ContainerState], reasons: &mut BTreeMap<String, String>) {
    for state in states {
        if let Some(waiting) = &state.waiting {
            if waiting.reason == CONTAINER_CREATING {
                continue;
            }
            reasons.insert(waiting.reason.clone(), waiting.message.clone());
        }
    }
}

/// Collect pod conditions whose status is not the healthy tri-state.
fn collect_pod_conditions(conditions: &[Condition], reasons: &mut BTreeMap<String, String>) {
    for condition in conditions {
        if condition.status != ConditionStatus::True {
            reasons.insert(condition.reason.clone(), condition.message.clone());
        }
    }
}
