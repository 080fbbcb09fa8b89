mod args;
mod client;
mod output;

use anyhow::Result;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use skiff_common::{NodeSnapshot, WorkloadRecord, WorkloadSpec};

use crate::args::{Args, Command, NodesCommand, PodsCommand};
use crate::client::{api_url, error_message};
use crate::output::{print_nodes, print_workload, print_workloads};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = Client::new();
    tracing::debug!(control_url = %args.control_url, "using control plane");

    match args.command {
        Command::Pods { subcommand } => match subcommand {
            PodsCommand::Create { name, image } => {
                let url = api_url(&args.control_url, "/pods");
                let resp = client
                    .post(&url)
                    .json(&WorkloadSpec::new(name, image))
                    .send()
                    .await?;
                if resp.status().is_success() {
                    let pod: WorkloadRecord = resp.json().await?;
                    print_workload(&pod);
                } else {
                    let status = resp.status();
                    eprintln!("✗ Failed to create pod ({}): {}", status, error_message(&resp.text().await?));
                    std::process::exit(1);
                }
            }
            PodsCommand::List => {
                let url = api_url(&args.control_url, "/pods");
                let resp = client.get(&url).send().await?;
                if resp.status().is_success() {
                    let pods: Vec<WorkloadRecord> = resp.json().await?;
                    print_workloads(&pods);
                } else {
                    eprintln!("✗ Failed to list pods: {}", error_message(&resp.text().await?));
                    std::process::exit(1);
                }
            }
        },
        Command::Nodes { subcommand } => match subcommand {
            NodesCommand::List => {
                let url = api_url(&args.control_url, "/nodes");
                let resp = client.get(&url).send().await?;
                if resp.status().is_success() {
                    let nodes: Vec<NodeSnapshot> = resp.json().await?;
                    print_nodes(&nodes);
                } else {
                    eprintln!("✗ Failed to list nodes: {}", error_message(&resp.text().await?));
                    std::process::exit(1);
                }
            }
        },
        Command::Metrics => {
            let url = api_url(&args.control_url, "/metrics");
            let resp = client.get(&url).send().await?;
            print!("{}", resp.text().await?);
        }
    }

    Ok(())
}
