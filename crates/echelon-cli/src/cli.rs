use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "echelon", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (defaults to the config file, then "info")
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (defaults to <config dir>/echelon/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Place safety stock in a supply network
    Solve(SolveArgs),
    /// Graph utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SolveArgs {
    /// Supply network file (.txt/.dag or .json)
    #[arg(value_hint = ValueHint::FilePath)]
    pub graph: PathBuf,

    /// Force the input format instead of detecting it (dag, json)
    #[arg(long)]
    pub format: Option<String>,

    /// Convergence tolerance on the total approximation error
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Stop after this many solver passes
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// MIP solver (e.g., microlp)
    #[arg(long)]
    pub solver: Option<String>,

    /// Indicator constant (derived from the network when omitted)
    #[arg(long)]
    pub big_m: Option<f64>,

    /// Net replenishment output file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    /// Also write a JSON report here
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub json: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Graph stats summary
    Stats {
        /// Supply network file
        graph: PathBuf,
    },
    /// Export graph to various formats
    Export {
        /// Supply network file
        graph: PathBuf,
        /// Output format (dot, graphviz or json)
        #[arg(long, default_value = "dot")]
        format: String,
        /// Optional output file path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file location
    Path,
    /// Write a default configuration file if none exists
    Init,
}
