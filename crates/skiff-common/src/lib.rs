pub mod client;
pub mod node_snapshot;
pub mod workload;

pub use client::{NodeClient, NodeClientError};
pub use node_snapshot::NodeSnapshot;
pub use workload::{InvalidSpec, WorkloadRecord, WorkloadSpec};

pub mod telemetry;
