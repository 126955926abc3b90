use clap::Parser;
use pumpwatch::cli::{Cli, Commands};
use pumpwatch::config::Config;
use pumpwatch::notify::status_text;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) if e.is_missing_file() => {
            eprintln!("Warning: {} not found, using default configuration", cli.config);
            Config::from_toml(include_str!("../config.toml.example"))?
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("Invalid config {}", cli.config)));
        }
    };

    // Initialize telemetry
    let _telemetry = pumpwatch::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(
                universe = config.source.universe_size,
                quote = %config.source.quote_currency,
                "Starting pumpwatch"
            );
            tokio::select! {
                result = args.execute(&config) => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, shutting down");
                }
            }
        }
        Commands::Status => {
            println!("{}", status_text(&config));
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
