mod args;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use skiff_agent::{AgentConfig, NodeAgent};

use crate::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let telemetry = skiff_common::telemetry::init_tracing(
        "skiff-agent",
        args.otlp_endpoint.as_deref(),
        args.otlp_token.as_deref(),
    );

    if args.min_consumption > args.max_consumption {
        anyhow::bail!(
            "--min-consumption ({}) must not exceed --max-consumption ({})",
            args.min_consumption,
            args.max_consumption
        );
    }

    let config = AgentConfig {
        capacity: args.capacity,
        unit_cost: args.unit_cost,
        consumption: args.min_consumption..args.max_consumption,
    };
    let agent = Arc::new(NodeAgent::new(args.node_name, config));
    tracing::debug!(otlp = telemetry.otlp_enabled(), "telemetry initialized");

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
        }
        on_signal.cancel();
    });

    let listener = tokio::net::TcpListener::bind(&args.listen_addr).await?;
    skiff_agent::serve(listener, agent, shutdown).await?;
    Ok(())
}
