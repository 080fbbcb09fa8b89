use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "skiff")]
#[command(about = "Skiff CLI for workload and node inspection", long_about = None)]
pub struct Args {
    /// Control plane URL
    #[arg(
        long,
        env = "SKIFF_CONTROL_URL",
        default_value = "http://127.0.0.1:8090"
    )]
    pub control_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Workload management
    Pods {
        #[command(subcommand)]
        subcommand: PodsCommand,
    },
    /// Node inspection
    Nodes {
        #[command(subcommand)]
        subcommand: NodesCommand,
    },
    /// Fetch control plane metrics
    Metrics,
}

#[derive(Debug, Subcommand)]
pub enum PodsCommand {
    /// Create a workload and let the control plane place it
    Create {
        #[arg(long)]
        name: String,
        /// Container image reference
        #[arg(long)]
        image: String,
    },
    /// List registered workloads
    List,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List the last observed status of every node
    List,
}
