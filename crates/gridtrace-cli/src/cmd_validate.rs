use anyhow::Result;
use gridtrace::v1::Network;
use std::path::PathBuf;

use crate::trace_args::read_network;

pub fn run(input: PathBuf) -> Result<()> {
    let network = read_network(&input)?;
    println!("{}", summary(&network));
    Ok(())
}

fn summary(network: &Network) -> String {
    let unconnected = network.all_terminals().filter(|t| t.node.is_none()).count();
    let mut line = format!(
        "Valid network: {} equipment, {} terminals, {} connectivity nodes, {} feeders",
        network.all_equipment().count(),
        network.all_terminals().count(),
        network.node_count(),
        network.feeders().count()
    );
    if unconnected > 0 {
        line.push_str(&format!(" ({} unconnected terminals)", unconnected));
    }
    line
}
