//! Simulated node agent: capacity accounting for one node and the HTTP
//! surface the control plane polls and places workloads through.

pub mod agent;
pub mod api;

pub use agent::{AgentConfig, NodeAgent, PlaceError, Placement};
pub use api::{build_router, serve};
