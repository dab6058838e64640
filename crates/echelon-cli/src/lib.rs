pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, ConfigCommands, GraphCommands, SolveArgs};
pub use config::{load_config, EchelonConfig};
