use clap::Parser;
use gmo_ticks::cli::{Cli, Commands};
use gmo_ticks::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = gmo_ticks::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting tick collection");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {} {}", config.feed.ws_endpoint, config.feed.symbol);
            println!("  Store: {}", config.store.db_path.display());
            println!(
                "  Pipeline: flush every {}ms, high-water mark {}",
                config.pipeline.flush_interval_ms, config.pipeline.buffer_high_water_mark
            );
        }
    }

    Ok(())
}
