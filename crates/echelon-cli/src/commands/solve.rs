//! Safety-stock placement command

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use echelon_algo::placement::{solve_placement, LpSolverKind, PlacementConfig, PlacementSolution};
use echelon_cli::cli::SolveArgs;
use echelon_cli::config::EchelonConfig;
use echelon_io::exporters::{write_net_replenishment, write_solution_json};
use echelon_io::importers::{load_network, load_network_as, Format};
use tabwriter::TabWriter;
use tracing::{info, warn};

pub fn handle(args: &SolveArgs, config: &EchelonConfig) -> Result<()> {
    let start = Instant::now();

    let imported = match &args.format {
        Some(format) => load_network_as(&args.graph, format.parse::<Format>()?),
        None => load_network(&args.graph),
    }
    .context("loading supply network")?;
    for issue in imported.diagnostics.warnings() {
        warn!("{issue}");
    }
    let network = imported.network;
    info!("Network loaded: {}", network.stats());

    let placement = placement_config(args, &config.placement)?;
    let solution = solve_placement(&network, &placement).context("placing safety stock")?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.file));
    write_net_replenishment(&out, &solution.net_replenishment_records())?;

    let json = args
        .json
        .clone()
        .or_else(|| config.output.json_report.as_ref().map(PathBuf::from));
    if let Some(path) = &json {
        write_solution_json(path, &solution)?;
    }

    print_solution(&solution)?;
    println!("Optimal value: {}", solution.true_total_cost);
    println!("Termination: {}", solution.termination);
    println!("Elapsed: {:.3?}", start.elapsed());
    println!("Results written to {}", out.display());
    if let Some(path) = json {
        println!("Report written to {}", path.display());
    }

    if !solution.is_success() {
        bail!(
            "placement {} after {} iterations; results are the best pass found",
            solution.termination,
            solution.iterations
        );
    }
    Ok(())
}

/// Command-line flags override the configuration file.
fn placement_config(args: &SolveArgs, base: &PlacementConfig) -> Result<PlacementConfig> {
    let mut config = base.clone();
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(limit) = args.max_iterations {
        config.max_iterations = Some(limit);
    }
    if let Some(big_m) = args.big_m {
        config.big_m = Some(big_m);
    }
    if let Some(solver) = &args.solver {
        config.solver = solver.parse::<LpSolverKind>()?;
    }
    config.validate()?;
    Ok(config)
}

fn print_solution(solution: &PlacementSolution) -> Result<()> {
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "Stage\tS\tSI\tNRP\tCost")?;
    for node in &solution.nodes {
        writeln!(
            tw,
            "{}\t{:.3}\t{:.3}\t{:.3}\t{:.4}",
            node.name,
            node.outbound_service_time,
            node.inbound_service_time,
            node.net_replenishment_period,
            node.safety_stock_cost
        )?;
    }
    tw.flush()?;
    Ok(())
}
