//! Periodic status polling of node agents.
//!
//! Every `interval` the loop queries all registered agents concurrently and
//! waits for the whole round before arming the next tick, so there is at
//! most one outstanding query per node. Each query is bounded by `timeout`;
//! a failed or late query leaves that node's cached snapshot untouched.
//! Cancelling the shutdown token abandons in-flight queries and stops the
//! loop.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use skiff_common::{NodeClient, NodeClientError};

use crate::control_plane::ControlPlane;
use crate::metrics::Metrics;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between the start of consecutive rounds. Must be non-zero.
    pub interval: Duration,
    /// Deadline for a single status query.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryOutcome {
    Refreshed,
    Failed,
    Cancelled,
}

/// Tally of one poll round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub refreshed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Run one poll round over every registered agent.
pub async fn poll_once(
    control: &ControlPlane,
    timeout: Duration,
    shutdown: &CancellationToken,
) -> RoundReport {
    let queries = control
        .agents()
        .iter()
        .map(|agent| poll_node(control, agent.as_ref(), timeout, shutdown));

    let mut report = RoundReport::default();
    for outcome in join_all(queries).await {
        match outcome {
            QueryOutcome::Refreshed => report.refreshed += 1,
            QueryOutcome::Failed => report.failed += 1,
            QueryOutcome::Cancelled => report.cancelled += 1,
        }
    }
    report
}

async fn poll_node(
    control: &ControlPlane,
    agent: &dyn NodeClient,
    timeout: Duration,
    shutdown: &CancellationToken,
) -> QueryOutcome {
    let node = agent.node_name();
    let result = tokio::select! {
        biased;
        _ = shutdown.cancelled() => return QueryOutcome::Cancelled,
        res = tokio::time::timeout(timeout, agent.status()) => {
            res.unwrap_or_else(|_| Err(NodeClientError::Timeout {
                node: node.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }))
        }
    };

    match result {
        Ok(snapshot) => {
            if snapshot.node_name != node {
                tracing::warn!(
                    node,
                    reported = %snapshot.node_name,
                    "agent reports a different node name, caching under the reported one"
                );
            }
            tracing::debug!(
                node = %snapshot.node_name,
                available_memory = snapshot.available_memory,
                running_pods = snapshot.running_pods_count,
                "received node status"
            );
            control.record_snapshot(snapshot).await;
            QueryOutcome::Refreshed
        }
        Err(err) => {
            Metrics::inc(&control.metrics().poll_failures_total);
            tracing::warn!(node, error = %err, "failed to get node status, keeping last snapshot");
            QueryOutcome::Failed
        }
    }
}

/// Poll all agents every `config.interval` until `shutdown` is cancelled.
///
/// The first round starts one full interval after the call.
pub async fn run_poll_loop(
    control: Arc<ControlPlane>,
    config: PollConfig,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(
        interval_ms = config.interval.as_millis() as u64,
        timeout_ms = config.timeout.as_millis() as u64,
        agents = control.agents().len(),
        "poll loop started"
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tracing::info!("polling node agents for status");
        let report = poll_once(&control, config.timeout, &shutdown).await;
        Metrics::inc(&control.metrics().poll_rounds_total);
        tracing::debug!(
            refreshed = report.refreshed,
            failed = report.failed,
            cancelled = report.cancelled,
            "poll round finished"
        );
    }

    tracing::info!("poll loop stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use skiff_agent::{AgentConfig, NodeAgent};
    use skiff_common::{NodeSnapshot, WorkloadRecord};
    use skiff_scheduler::Scheduler;

    use super::*;

    /// In-memory agent that can be switched off.
    struct SwitchableNode {
        agent: NodeAgent,
        reachable: AtomicBool,
    }

    impl SwitchableNode {
        fn new(name: &str) -> Self {
            Self {
                agent: NodeAgent::new(name, AgentConfig::default()),
                reachable: AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl NodeClient for SwitchableNode {
        fn node_name(&self) -> &str {
            self.agent.node_name()
        }

        async fn status(&self) -> Result<NodeSnapshot, NodeClientError> {
            if !self.reachable.load(Ordering::SeqCst) {
                return Err(NodeClientError::Unavailable {
                    node: self.node_name().to_string(),
                });
            }
            Ok(self.agent.get_status().await)
        }

        async fn place(&self, workload: &WorkloadRecord) -> Result<(), NodeClientError> {
            self.agent.place(workload).await
        }
    }

    /// Never answers a status query.
    struct HungNode;

    #[async_trait]
    impl NodeClient for HungNode {
        fn node_name(&self) -> &str {
            "node-hung"
        }

        async fn status(&self) -> Result<NodeSnapshot, NodeClientError> {
            std::future::pending().await
        }

        async fn place(&self, _workload: &WorkloadRecord) -> Result<(), NodeClientError> {
            Ok(())
        }
    }

    fn agents(names: &[&str]) -> Vec<Arc<dyn NodeClient>> {
        names
            .iter()
            .map(|n| Arc::new(NodeAgent::new(*n, AgentConfig::default())) as Arc<dyn NodeClient>)
            .collect()
    }

    #[tokio::test]
    async fn test_poll_once_fills_cache() {
        let cp = ControlPlane::new(agents(&["node-02", "node-01", "node-03"]), Scheduler::new());
        assert!(cp.list_node_snapshots().await.is_empty());

        let report = poll_once(&cp, DEFAULT_POLL_TIMEOUT, &CancellationToken::new()).await;
        assert_eq!(
            report,
            RoundReport {
                refreshed: 3,
                failed: 0,
                cancelled: 0
            }
        );

        let names: Vec<String> = cp
            .list_node_snapshots()
            .await
            .into_iter()
            .map(|s| s.node_name)
            .collect();
        assert_eq!(names, vec!["node-01", "node-02", "node-03"]);
    }

    #[tokio::test]
    async fn test_unreachable_node_keeps_last_snapshot() {
        let flaky = Arc::new(SwitchableNode::new("node-01"));
        let cp = ControlPlane::new(vec![flaky.clone() as Arc<dyn NodeClient>], Scheduler::new());
        let token = CancellationToken::new();

        cp.create_workload(&skiff_common::WorkloadSpec::new("nginx", "nginx:latest"))
            .await
            .unwrap();
        poll_once(&cp, DEFAULT_POLL_TIMEOUT, &token).await;
        let before = serde_json::to_vec(&cp.list_node_snapshots().await).unwrap();

        flaky.reachable.store(false, Ordering::SeqCst);
        // The node's real state moves on while it is unreachable.
        flaky
            .agent
            .place_workload(WorkloadRecord::new("redis", "redis:7", "node-01"))
            .await
            .unwrap();

        for _ in 0..3 {
            let report = poll_once(&cp, DEFAULT_POLL_TIMEOUT, &token).await;
            assert_eq!(report.failed, 1);
        }

        let after = serde_json::to_vec(&cp.list_node_snapshots().await).unwrap();
        assert_eq!(before, after);
        assert_eq!(
            cp.metrics().poll_failures_total.load(Ordering::Relaxed),
            3
        );

        // Still a scheduling candidate.
        let record = cp
            .create_workload(&skiff_common::WorkloadSpec::new("web", "nginx:latest"))
            .await
            .unwrap();
        assert_eq!(record.node_name, "node-01");
    }

    #[tokio::test]
    async fn test_hung_node_is_cut_off_by_deadline() {
        let mut clients = agents(&["node-01", "node-02"]);
        clients.push(Arc::new(HungNode));
        let cp = ControlPlane::new(clients, Scheduler::new());

        let started = std::time::Instant::now();
        let report = poll_once(&cp, Duration::from_millis(100), &CancellationToken::new()).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        assert_eq!(report.refreshed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(cp.list_node_snapshots().await.len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_abandons_in_flight_queries() {
        let cp = ControlPlane::new(vec![Arc::new(HungNode) as Arc<dyn NodeClient>], Scheduler::new());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            poll_once(&cp, Duration::from_secs(3600), &token),
        )
        .await
        .expect("cancellation did not interrupt the round");
        assert_eq!(report.cancelled, 1);
        assert!(cp.list_node_snapshots().await.is_empty());
    }

    #[tokio::test]
    async fn test_loop_waits_one_interval_then_polls() {
        let cp = Arc::new(ControlPlane::new(agents(&["node-01"]), Scheduler::new()));
        let token = CancellationToken::new();
        let config = PollConfig {
            interval: Duration::from_millis(200),
            timeout: Duration::from_millis(500),
        };
        let handle = tokio::spawn(run_poll_loop(cp.clone(), config, token.clone()));

        assert!(cp.list_node_snapshots().await.is_empty());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cp.list_node_snapshots().await.len(), 1);
        assert!(cp.metrics().poll_rounds_total.load(Ordering::Relaxed) >= 1);

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poll loop did not stop")
            .unwrap();
    }
}
