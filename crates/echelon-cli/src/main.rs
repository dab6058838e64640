use clap::Parser;
use echelon_cli::{load_config, Cli, Commands, ConfigCommands, EchelonConfig};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    // `config init` creates the file that would otherwise be loaded here
    let creating = matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Init
        })
    );
    let loaded = if creating {
        Ok(EchelonConfig::default())
    } else {
        load_config(cli.config.as_deref())
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    };

    let level = cli
        .log_level
        .or_else(|| config.logging.tracing_level().ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    let (name, result) = match &cli.command {
        Some(Commands::Solve(args)) => {
            info!("Placing safety stock for {}", args.graph.display());
            ("Solve", commands::solve::handle(args, &config))
        }
        Some(Commands::Graph { command }) => ("Graph", commands::graph::handle(command)),
        Some(Commands::Config { command }) => (
            "Config",
            commands::config::handle(command, cli.config.as_deref(), &config),
        ),
        None => {
            info!("No command given; run `echelon --help` for usage");
            return;
        }
    };

    if let Err(e) = result {
        error!("{name} failed: {e:?}");
        std::process::exit(1);
    }
}
