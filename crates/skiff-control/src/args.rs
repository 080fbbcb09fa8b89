use clap::Parser;

use skiff_agent::agent::{AgentConfig, DEFAULT_CAPACITY, DEFAULT_CONSUMPTION, DEFAULT_UNIT_COST};

/// Agent reachable over HTTP, given as `NAME=URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAgent {
    pub name: String,
    pub url: String,
}

/// Agent served in-process on a local port, given as `NAME=PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedAgent {
    pub name: String,
    pub port: u16,
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(format!("expected NAME=VALUE, got '{s}'"));
    }
    Ok((name, value))
}

pub fn parse_remote_agent(s: &str) -> Result<RemoteAgent, String> {
    let (name, url) = split_pair(s)?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("agent url must start with http:// or https://, got '{url}'"));
    }
    Ok(RemoteAgent {
        name: name.to_string(),
        url: url.to_string(),
    })
}

pub fn parse_embedded_agent(s: &str) -> Result<EmbeddedAgent, String> {
    let (name, port) = split_pair(s)?;
    let port = port
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{port}': {e}"))?;
    Ok(EmbeddedAgent {
        name: name.to_string(),
        port,
    })
}

/// Agents embedded when none are configured.
pub fn default_embedded_agents() -> Vec<EmbeddedAgent> {
    (1..=3)
        .map(|i| EmbeddedAgent {
            name: format!("node-{i:02}"),
            port: 8080 + i,
        })
        .collect()
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long, env = "SKIFF_CONTROL_ADDR", default_value = "0.0.0.0:8090")]
    pub listen_addr: String,

    /// Remote node agent, `NAME=URL`. Repeatable.
    #[arg(long = "agent", value_parser = parse_remote_agent)]
    pub agents: Vec<RemoteAgent>,

    /// Node agent to run in this process, `NAME=PORT`. Repeatable.
    #[arg(long = "embedded-agent", value_parser = parse_embedded_agent)]
    pub embedded_agents: Vec<EmbeddedAgent>,

    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Deadline for a single node status query.
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_timeout_ms: u64,

    /// Deadline for a placement request to an agent.
    #[arg(long, default_value_t = 10000, value_parser = clap::value_parser!(u64).range(1..))]
    pub place_timeout_ms: u64,

    /// Simulated memory of each embedded agent in MB.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub agent_capacity: i64,

    /// Per-workload cost embedded agents subtract when reporting status.
    #[arg(long, default_value_t = DEFAULT_UNIT_COST)]
    pub agent_unit_cost: i64,

    /// Lower bound (inclusive) of the memory embedded agents charge per placement.
    #[arg(long, default_value_t = DEFAULT_CONSUMPTION.start)]
    pub agent_min_consumption: i64,

    /// Upper bound (exclusive) of the memory embedded agents charge per placement.
    #[arg(long, default_value_t = DEFAULT_CONSUMPTION.end)]
    pub agent_max_consumption: i64,

    /// Placement strategy: `random` or `round_robin`.
    #[arg(long, env = "SKIFF_STRATEGY", default_value = "random")]
    pub strategy: String,

    /// OTLP/HTTP endpoint for span export.
    #[arg(long, env = "SKIFF_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Bearer token for the OTLP endpoint.
    #[arg(long, env = "SKIFF_OTLP_TOKEN")]
    pub otlp_token: Option<String>,
}

impl Args {
    /// Simulation settings shared by every embedded agent.
    pub fn embedded_agent_config(&self) -> anyhow::Result<AgentConfig> {
        if self.agent_min_consumption > self.agent_max_consumption {
            anyhow::bail!(
                "--agent-min-consumption ({}) must not exceed --agent-max-consumption ({})",
                self.agent_min_consumption,
                self.agent_max_consumption
            );
        }
        Ok(AgentConfig {
            capacity: self.agent_capacity,
            unit_cost: self.agent_unit_cost,
            consumption: self.agent_min_consumption..self.agent_max_consumption,
        })
    }
}
