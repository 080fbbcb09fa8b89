use skiff_common::{NodeSnapshot, WorkloadRecord};

pub fn print_workload(pod: &WorkloadRecord) {
    println!("✓ Pod '{}' created", pod.name);
    println!("  ID:       {}", pod.id);
    println!("  Image:    {}", pod.image);
    println!("  Node:     {}", pod.node_name);
    println!("  Created:  {}", pod.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
}

pub fn print_workloads(pods: &[WorkloadRecord]) {
    println!("\n=== Skiff Pods ===\n");
    if pods.is_empty() {
        println!("No pods found.");
        return;
    }
    println!(
        "{:<38} {:<20} {:<25} {:<12} {:<20}",
        "ID", "Name", "Image", "Node", "Created"
    );
    println!("{:-<118}", "");
    for p in pods {
        println!(
            "{:<38} {:<20} {:<25} {:<12} {:<20}",
            p.id,
            p.name,
            p.image,
            p.node_name,
            p.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
}

pub fn print_nodes(nodes: &[NodeSnapshot]) {
    println!("\n=== Skiff Nodes ===\n");
    if nodes.is_empty() {
        println!("No node status observed yet.");
        return;
    }
    println!("{:<20} {:>18} {:>14}", "Node", "Available (MB)", "Running Pods");
    println!("{:-<54}", "");
    for n in nodes {
        println!(
            "{:<20} {:>18} {:>14}",
            n.node_name, n.available_memory, n.running_pods_count
        );
    }
    println!();
}
