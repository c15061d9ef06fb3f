// Casper FFG Simulator - Entry point
// Principle: The engine is the library, the binary only drives it

mod cli;

use casper_ffg::CasperConfig;
use clap::Parser;
use cli::runner::{print_report, run_simulation};
use cli::{Cli, Commands};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_filter = if cli.verbose {
        "debug"
    } else {
        cli.log_level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .init();

    match cli.command {
        Commands::Simulate(cmd) => {
            let report = run_simulation(&cmd).map_err(|e| {
                error!("Simulation error: {}", e);
                anyhow::anyhow!("Simulation error: {}", e)
            })?;

            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::Config(cmd) => match (cmd.output, cmd.check) {
            (_, Some(path)) => {
                let config = CasperConfig::from_file(&path)
                    .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
                info!("✅ {} is valid", path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            (Some(path), None) => {
                CasperConfig::default().to_file(&path)?;
                info!("📝 Default configuration written to {}", path.display());
            }
            (None, None) => {
                println!("{}", serde_json::to_string_pretty(&CasperConfig::default())?);
            }
        },
    }

    Ok(())
}
