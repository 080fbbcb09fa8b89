use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long, env = "SKIFF_NODE_NAME", default_value = "node-01")]
    pub node_name: String,

    #[arg(long, env = "SKIFF_AGENT_ADDR", default_value = "0.0.0.0:8081")]
    pub listen_addr: String,

    /// Simulated memory of the node in MB.
    #[arg(long, default_value_t = skiff_agent::agent::DEFAULT_CAPACITY)]
    pub capacity: i64,

    /// Synthetic per-workload cost subtracted when reporting status.
    #[arg(long, default_value_t = skiff_agent::agent::DEFAULT_UNIT_COST)]
    pub unit_cost: i64,

    /// Lower bound (inclusive) of the memory charged per placement.
    #[arg(long, default_value_t = skiff_agent::agent::DEFAULT_CONSUMPTION.start)]
    pub min_consumption: i64,

    /// Upper bound (exclusive) of the memory charged per placement.
    #[arg(long, default_value_t = skiff_agent::agent::DEFAULT_CONSUMPTION.end)]
    pub max_consumption: i64,

    /// OTLP/HTTP endpoint for span export.
    #[arg(long, env = "SKIFF_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Bearer token for the OTLP endpoint.
    #[arg(long, env = "SKIFF_OTLP_TOKEN")]
    pub otlp_token: Option<String>,
}
