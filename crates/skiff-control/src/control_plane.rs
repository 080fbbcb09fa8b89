use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use skiff_common::{NodeClient, NodeSnapshot, WorkloadRecord, WorkloadSpec};
use skiff_scheduler::{strategy::Candidate, Scheduler};

use crate::error::ControlError;
use crate::metrics::Metrics;

/// The control plane: workload registry, node snapshot cache and the set of
/// registered node agents.
///
/// Registry and cache sit behind independent locks. Neither lock is held
/// while talking to an agent.
pub struct ControlPlane {
    workloads: RwLock<HashMap<String, WorkloadRecord>>,
    snapshots: RwLock<HashMap<String, NodeSnapshot>>,
    agents: Vec<Arc<dyn NodeClient>>,
    scheduler: Scheduler,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for ControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let agents: Vec<&str> = self.agents.iter().map(|a| a.node_name()).collect();
        f.debug_struct("ControlPlane")
            .field("agents", &agents)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl ControlPlane {
    pub fn new(agents: Vec<Arc<dyn NodeClient>>, scheduler: Scheduler) -> Self {
        let names: Vec<&str> = agents.iter().map(|a| a.node_name()).collect();
        tracing::info!(agents = ?names, strategy = scheduler.strategy_name(), "control plane initialized");
        Self {
            workloads: RwLock::new(HashMap::new()),
            snapshots: RwLock::new(HashMap::new()),
            agents,
            scheduler,
            metrics: Arc::new(Metrics::default()),
        }
    }

    pub fn agents(&self) -> &[Arc<dyn NodeClient>] {
        &self.agents
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Validate `spec`, pick a node, record the workload and place it.
    ///
    /// The record is written before the agent is asked to run it. If the
    /// agent refuses or cannot be reached, the record is removed again. If
    /// the request went out but no answer came back, the agent may be running
    /// the workload, so the record is kept and counted as unconfirmed.
    pub async fn create_workload(&self, spec: &WorkloadSpec) -> Result<WorkloadRecord, ControlError> {
        let (name, image) = spec.validate()?;

        let agent = {
            let candidates: Vec<Candidate> = self
                .agents
                .iter()
                .map(|a| Candidate {
                    node_name: a.node_name(),
                })
                .collect();
            let idx = self.scheduler.select(&candidates).inspect_err(|_| {
                tracing::warn!(workload = name, "no available nodes to schedule workload");
            })?;
            self.agents[idx].clone()
        };

        let record = WorkloadRecord::new(name, image, agent.node_name());
        self.workloads
            .write()
            .await
            .insert(record.id.clone(), record.clone());

        if let Err(err) = agent.place(&record).await {
            if err.outcome_unknown() {
                Metrics::inc(&self.metrics.placements_unconfirmed_total);
                tracing::warn!(
                    workload = %record.name,
                    id = %record.id,
                    node = %record.node_name,
                    error = %err,
                    "placement not acknowledged, keeping workload"
                );
                return Ok(record);
            }

            self.workloads.write().await.remove(&record.id);
            Metrics::inc(&self.metrics.placement_failures_total);
            tracing::warn!(
                workload = %record.name,
                id = %record.id,
                node = %record.node_name,
                error = %err,
                "placement failed, workload rolled back"
            );
            return Err(ControlError::Placement {
                node: record.node_name,
                source: err,
            });
        }

        Metrics::inc(&self.metrics.workloads_created_total);
        tracing::info!(
            workload = %record.name,
            id = %record.id,
            node = %record.node_name,
            "scheduled workload"
        );
        Ok(record)
    }

    /// Every registered workload, oldest first.
    pub async fn list_workloads(&self) -> Vec<WorkloadRecord> {
        let workloads = self.workloads.read().await;
        let mut out: Vec<WorkloadRecord> = workloads.values().cloned().collect();
        out.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        out
    }

    /// Last successful snapshot of every node polled at least once, by name.
    pub async fn list_node_snapshots(&self) -> Vec<NodeSnapshot> {
        let snapshots = self.snapshots.read().await;
        let mut out: Vec<NodeSnapshot> = snapshots.values().cloned().collect();
        out.sort_by(|a, b| a.node_name.cmp(&b.node_name));
        out
    }

    /// Overwrite the cached snapshot for `snapshot.node_name`.
    pub async fn record_snapshot(&self, snapshot: NodeSnapshot) {
        self.snapshots
            .write()
            .await
            .insert(snapshot.node_name.clone(), snapshot);
    }
}
