use std::path::Path;

use anyhow::Result;
use echelon_cli::cli::ConfigCommands;
use echelon_cli::config::{config_path, init_config, EchelonConfig};

pub fn handle(command: &ConfigCommands, explicit: Option<&Path>, config: &EchelonConfig) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };
    match command {
        ConfigCommands::Show => print!("{}", toml::to_string_pretty(config)?),
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init => {
            if init_config(&path)? {
                println!("Configuration written to {}", path.display());
            } else {
                println!("Configuration already exists at {}", path.display());
            }
        }
    }
    Ok(())
}
