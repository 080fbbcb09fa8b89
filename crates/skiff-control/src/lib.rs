//! Control plane: workload registry, node snapshot cache, placement and the
//! periodic status poll over registered node agents.

pub mod api;
pub mod client;
pub mod control_plane;
pub mod error;
pub mod metrics;
pub mod poll;

pub use api::{build_router, AppState};
pub use client::{build_http_client, HttpNodeClient};
pub use control_plane::ControlPlane;
pub use error::ControlError;
pub use poll::{poll_once, run_poll_loop, PollConfig, RoundReport};
