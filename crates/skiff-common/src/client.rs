use async_trait::async_trait;
use thiserror::Error;

use crate::{NodeSnapshot, WorkloadRecord};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NodeClientError {
    #[error("request to node '{node}' failed: {message}")]
    Transport { node: String, message: String },

    #[error("node '{node}' answered with HTTP {status}")]
    Status { node: String, status: u16 },

    #[error("node '{node}' sent an unreadable response: {message}")]
    Decode { node: String, message: String },

    #[error("node '{node}' did not answer within {timeout_ms}ms")]
    Timeout { node: String, timeout_ms: u64 },

    #[error("node '{node}' is unavailable")]
    Unavailable { node: String },

    #[error("node '{node}' rejected the request: {reason}")]
    Rejected { node: String, reason: String },
}

impl NodeClientError {
    /// True when the request may have taken effect on the node even though
    /// no answer arrived: the request was sent but the connection broke or
    /// the deadline passed first.
    pub fn outcome_unknown(&self) -> bool {
        matches!(
            self,
            NodeClientError::Transport { .. } | NodeClientError::Timeout { .. }
        )
    }
}

/// The capability through which the control plane reaches a node agent.
///
/// Implemented over HTTP for remote agents and directly by the agent type
/// for in-process use.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Name the agent was registered under.
    fn node_name(&self) -> &str;

    async fn status(&self) -> Result<NodeSnapshot, NodeClientError>;

    async fn place(&self, workload: &WorkloadRecord) -> Result<(), NodeClientError>;
}
