mod args;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use skiff_agent::NodeAgent;
use skiff_common::NodeClient;
use skiff_control::{build_http_client, build_router, ControlPlane, HttpNodeClient, PollConfig};
use skiff_scheduler::{strategy::parse_strategy, Scheduler};

use crate::args::{default_embedded_agents, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let telemetry = skiff_common::telemetry::init_tracing(
        "skiff-control",
        args.otlp_endpoint.as_deref(),
        args.otlp_token.as_deref(),
    );

    let poll = PollConfig {
        interval: Duration::from_millis(args.poll_interval_ms),
        timeout: Duration::from_millis(args.poll_timeout_ms),
    };
    let place_timeout = Duration::from_millis(args.place_timeout_ms);
    let agent_config = args.embedded_agent_config()?;
    let http = build_http_client().context("failed to build http client")?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
        }
        on_signal.cancel();
    });

    let embedded = if args.agents.is_empty() && args.embedded_agents.is_empty() {
        default_embedded_agents()
    } else {
        args.embedded_agents
    };

    let mut seen = HashSet::new();
    let mut agents: Vec<Arc<dyn NodeClient>> = Vec::new();

    for spec in embedded {
        if !seen.insert(spec.name.clone()) {
            anyhow::bail!("duplicate agent name '{}'", spec.name);
        }
        let listener = TcpListener::bind(("0.0.0.0", spec.port))
            .await
            .with_context(|| format!("failed to bind agent '{}' on port {}", spec.name, spec.port))?;
        let agent = Arc::new(NodeAgent::new(spec.name.clone(), agent_config.clone()));
        let token = shutdown.child_token();
        let name = spec.name.clone();
        tokio::spawn(async move {
            if let Err(e) = skiff_agent::serve(listener, agent, token).await {
                tracing::error!(node = %name, error = %e, "embedded agent exited");
            }
        });

        let url = format!("http://127.0.0.1:{}", spec.port);
        agents.push(Arc::new(
            HttpNodeClient::new(spec.name, &url, http.clone()).with_place_timeout(place_timeout),
        ));
    }

    for remote in args.agents {
        if !seen.insert(remote.name.clone()) {
            anyhow::bail!("duplicate agent name '{}'", remote.name);
        }
        agents.push(Arc::new(
            HttpNodeClient::new(remote.name, &remote.url, http.clone())
                .with_place_timeout(place_timeout),
        ));
    }

    let strategy = parse_strategy(&args.strategy).map_err(|e| anyhow::anyhow!(e))?;
    let scheduler = Scheduler::with_strategy(strategy);
    tracing::info!(
        strategy = scheduler.strategy_name(),
        agents = agents.len(),
        otlp = telemetry.otlp_enabled(),
        "control plane configured"
    );

    let control = Arc::new(ControlPlane::new(agents, scheduler));

    let poller = tokio::spawn(skiff_control::run_poll_loop(
        control.clone(),
        poll,
        shutdown.clone(),
    ));

    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    tracing::info!(addr = %args.listen_addr, "control plane listening");

    axum::serve(listener, build_router(control))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    shutdown.cancel();
    join_background("poll loop", poller).await;
    Ok(())
}

/// Wait for a background task, logging a panic or abort instead of
/// discarding it. Returns whether the task finished normally.
async fn join_background(task: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(task, error = %e, "background task failed");
            false
        }
    }
}
