use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use echelon_cli::cli::GraphCommands;
use echelon_core::graph_utils;
use echelon_io::importers::{self, GraphDocument};

pub fn handle(command: &GraphCommands) -> Result<()> {
    match command {
        GraphCommands::Stats { graph } => {
            let imported = importers::load_network(graph)?;
            let network = &imported.network;
            let stats = graph_utils::graph_stats(network)?;
            let summary = network.stats();
            println!("Graph statistics for {}:", graph.display());
            println!("  Stages        : {}", stats.node_count);
            println!("  Links         : {}", stats.edge_count);
            println!("  Components    : {}", stats.connected_components);
            println!(
                "  Demand/supply : {}/{}",
                summary.num_demand_stages, summary.num_supply_stages
            );
            println!(
                "  Degree [in/out max]: {}/{}",
                stats.max_in_degree, stats.max_out_degree
            );
            println!("  Density       : {:.4}", stats.density);
            println!("  Longest lead-time path: {}", stats.longest_lead_time_path);
            println!("  Diagnostics   : {}", imported.diagnostics.summary());
            Ok(())
        }
        GraphCommands::Export { graph, format, out } => {
            let network = importers::load_network(graph)?.network;
            let payload = match format.to_ascii_lowercase().as_str() {
                "json" => serde_json::to_string_pretty(&GraphDocument::from_network(&network))?,
                "dot" | "graphviz" => graph_utils::export_graph(&network, format)?,
                other => bail!("unsupported graph export format '{other}'"),
            };
            emit(&payload, out.as_deref())
        }
    }
}

fn emit(payload: &str, out: Option<&Path>) -> Result<()> {
    if let Some(path) = out {
        fs::write(path, payload)?;
        println!("Graph exported to {}", path.display());
    } else {
        println!("{payload}");
    }
    Ok(())
}
