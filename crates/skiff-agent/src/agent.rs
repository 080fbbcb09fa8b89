use std::collections::HashMap;
use std::ops::Range;

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;
use tokio::sync::RwLock;

use skiff_common::{NodeClient, NodeClientError, NodeSnapshot, WorkloadRecord};

/// Default simulated memory of a node, in MB.
pub const DEFAULT_CAPACITY: i64 = 2048;
/// Synthetic per-workload cost subtracted when reporting status.
pub const DEFAULT_UNIT_COST: i64 = 100;
/// Half-open range the per-placement consumption is drawn from.
pub const DEFAULT_CONSUMPTION: Range<i64> = 50..200;

/// Simulation constants, fixed for the lifetime of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub capacity: i64,
    pub unit_cost: i64,
    pub consumption: Range<i64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            unit_cost: DEFAULT_UNIT_COST,
            consumption: DEFAULT_CONSUMPTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("workload {id} is assigned to node '{assigned}', not '{node}'")]
    WrongNode {
        id: String,
        assigned: String,
        node: String,
    },
}

/// Result of a placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Newly recorded; `consumed` MB were charged.
    Placed { record: WorkloadRecord, consumed: i64 },
    /// The id was already running here. Nothing was charged.
    AlreadyPlaced(WorkloadRecord),
}

impl Placement {
    pub fn record(&self) -> &WorkloadRecord {
        match self {
            Placement::Placed { record, .. } | Placement::AlreadyPlaced(record) => record,
        }
    }
}

#[derive(Debug)]
struct AgentState {
    pods: HashMap<String, WorkloadRecord>,
    available_memory: i64,
}

/// A simulated cluster node: capacity accounting plus the set of workloads
/// placed on it. Nothing is ever removed.
#[derive(Debug)]
pub struct NodeAgent {
    node_name: String,
    config: AgentConfig,
    state: RwLock<AgentState>,
}

impl NodeAgent {
    pub fn new(node_name: impl Into<String>, config: AgentConfig) -> Self {
        let node_name = node_name.into();
        tracing::info!(
            node = %node_name,
            capacity = config.capacity,
            unit_cost = config.unit_cost,
            "node agent initialized"
        );
        Self {
            node_name,
            state: RwLock::new(AgentState {
                pods: HashMap::new(),
                available_memory: config.capacity,
            }),
            config,
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Current simulated status. Shares the lock with other readers.
    pub async fn get_status(&self) -> NodeSnapshot {
        let st = self.state.read().await;
        let running = st.pods.len() as i64;
        NodeSnapshot {
            node_name: self.node_name.clone(),
            available_memory: st.available_memory - running * self.config.unit_cost,
            running_pods_count: running as u64,
        }
    }

    /// Record `workload` as running here and charge a random amount of memory.
    ///
    /// There is no admission check: the counter is allowed to go negative.
    /// Placing an id that is already running is a no-op returning the stored
    /// record, so a resent request is never charged twice.
    pub async fn place_workload(&self, workload: WorkloadRecord) -> Result<Placement, PlaceError> {
        if workload.node_name != self.node_name {
            return Err(PlaceError::WrongNode {
                id: workload.id,
                assigned: workload.node_name,
                node: self.node_name.clone(),
            });
        }

        let mut st = self.state.write().await;
        if let Some(existing) = st.pods.get(&workload.id) {
            tracing::debug!(node = %self.node_name, id = %workload.id, "workload already running");
            return Ok(Placement::AlreadyPlaced(existing.clone()));
        }

        let consumed = self.draw_consumption();
        st.available_memory -= consumed;
        tracing::info!(
            node = %self.node_name,
            workload = %workload.name,
            id = %workload.id,
            consumed,
            available_memory = st.available_memory,
            "now running workload"
        );
        st.pods.insert(workload.id.clone(), workload.clone());
        Ok(Placement::Placed {
            record: workload,
            consumed,
        })
    }

    /// Workloads placed on this node, oldest first.
    pub async fn placed(&self) -> Vec<WorkloadRecord> {
        let st = self.state.read().await;
        let mut pods: Vec<WorkloadRecord> = st.pods.values().cloned().collect();
        pods.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        pods
    }

    fn draw_consumption(&self) -> i64 {
        let range = self.config.consumption.clone();
        if range.is_empty() {
            return range.start;
        }
        rand::thread_rng().gen_range(range)
    }
}

#[async_trait]
impl NodeClient for NodeAgent {
    fn node_name(&self) -> &str {
        &self.node_name
    }

    async fn status(&self) -> Result<NodeSnapshot, NodeClientError> {
        Ok(self.get_status().await)
    }

    async fn place(&self, workload: &WorkloadRecord) -> Result<(), NodeClientError> {
        self.place_workload(workload.clone())
            .await
            .map(|_| ())
            .map_err(|err| NodeClientError::Rejected {
                node: self.node_name.clone(),
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn agent() -> NodeAgent {
        NodeAgent::new("node-01", AgentConfig::default())
    }

    async fn charge(agent: &NodeAgent, record: WorkloadRecord) -> i64 {
        match agent.place_workload(record).await.unwrap() {
            Placement::Placed { consumed, .. } => consumed,
            other => panic!("expected a new placement, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fresh_agent_reports_full_capacity() {
        let snap = agent().get_status().await;
        assert_eq!(
            snap,
            NodeSnapshot {
                node_name: "node-01".to_string(),
                available_memory: DEFAULT_CAPACITY,
                running_pods_count: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_place_charges_within_range() {
        let agent = agent();
        let consumed = charge(&agent, WorkloadRecord::new("nginx", "nginx:latest", "node-01")).await;
        assert!(DEFAULT_CONSUMPTION.contains(&consumed));

        let snap = agent.get_status().await;
        assert_eq!(snap.running_pods_count, 1);
        assert_eq!(
            snap.available_memory,
            DEFAULT_CAPACITY - consumed - DEFAULT_UNIT_COST
        );
    }

    #[tokio::test]
    async fn test_capacity_goes_negative_without_clamping() {
        let agent = agent();
        let mut charged = 0;
        for i in 0..20 {
            charged += charge(&agent, WorkloadRecord::new(&format!("w{i}"), "busybox", "node-01")).await;
        }

        let snap = agent.get_status().await;
        // 20 placements cost at least 20 * (50 + 100) = 3000 > 2048.
        assert!(snap.available_memory < 0);
        assert_eq!(
            snap.available_memory,
            DEFAULT_CAPACITY - charged - 20 * DEFAULT_UNIT_COST
        );
        assert_eq!(snap.running_pods_count, 20);
    }

    #[tokio::test]
    async fn test_fixed_consumption_when_range_is_empty() {
        let agent = NodeAgent::new(
            "node-02",
            AgentConfig {
                capacity: 500,
                unit_cost: 0,
                consumption: 75..75,
            },
        );
        charge(&agent, WorkloadRecord::new("a", "img", "node-02")).await;
        assert_eq!(agent.get_status().await.available_memory, 425);
    }

    #[tokio::test]
    async fn test_repeated_id_is_not_charged_twice() {
        let agent = agent();
        let record = WorkloadRecord::new("nginx", "nginx:latest", "node-01");
        charge(&agent, record.clone()).await;
        let before = agent.get_status().await;

        let mut resent = record.clone();
        resent.image = "nginx:other".to_string();
        let again = agent.place_workload(resent).await.unwrap();

        assert_eq!(again, Placement::AlreadyPlaced(record.clone()));
        assert_eq!(agent.get_status().await, before);
        assert_eq!(agent.placed().await, vec![record]);
    }

    #[tokio::test]
    async fn test_workload_for_another_node_is_rejected() {
        let agent = agent();
        let record = WorkloadRecord::new("nginx", "nginx:latest", "node-02");

        let err = agent.place_workload(record.clone()).await.unwrap_err();
        assert_eq!(
            err,
            PlaceError::WrongNode {
                id: record.id.clone(),
                assigned: "node-02".to_string(),
                node: "node-01".to_string(),
            }
        );
        assert!(matches!(
            NodeClient::place(&agent, &record).await,
            Err(NodeClientError::Rejected { .. })
        ));
        assert_eq!(agent.get_status().await.available_memory, DEFAULT_CAPACITY);
        assert!(agent.placed().await.is_empty());
    }

    #[tokio::test]
    async fn test_status_readers_share_the_lock_but_wait_for_placement() {
        let agent = Arc::new(agent());

        let reader_guard = agent.state.read().await;
        tokio::time::timeout(Duration::from_secs(1), agent.get_status())
            .await
            .expect("status blocked behind another reader");
        drop(reader_guard);

        let writer_guard = agent.state.write().await;
        let pending = {
            let agent = agent.clone();
            tokio::spawn(async move { agent.get_status().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        drop(writer_guard);
        let snap = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .expect("status still blocked after the write lock was released")
            .unwrap();
        assert_eq!(snap.running_pods_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_placements_are_all_recorded() {
        let agent = Arc::new(agent());
        let mut handles = Vec::new();
        for i in 0..32 {
            let agent = agent.clone();
            handles.push(tokio::spawn(async move {
                let record = WorkloadRecord::new(&format!("w{i}"), "img", "node-01");
                NodeClient::place(agent.as_ref(), &record).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(agent.placed().await.len(), 32);
        assert_eq!(agent.status().await.unwrap().running_pods_count, 32);
    }
}
