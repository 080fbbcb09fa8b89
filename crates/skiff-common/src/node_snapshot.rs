use serde::{Deserialize, Serialize};

/// Last observed status of a node agent.
///
/// `available_memory` is signed: agents perform no admission check, so
/// enough placements push it below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub node_name: String,
    pub available_memory: i64,
    pub running_pods_count: u64,
}
