use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kabar::config::{Config, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "kabar",
    version,
    about = "Topic-scoped Kompas news crawler",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every configured topic and write the JSON report
    Crawl {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file, overriding the configured path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write Prometheus metrics in text format to this file after the run
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },

    /// Validate the configuration and list the topics without crawling
    Topics {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Crawl { config, .. } | Commands::Topics { config } => config.clone(),
    };
    let config = Config::load(config_path.as_deref())?;

    // Initialize tracing/logging
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging, cli.verbose)?;

    tracing::info!("kabar crawler starting");

    match cli.command {
        Commands::Crawl {
            config: _,
            output,
            metrics_out,
        } => {
            tracing::info!(
                config = ?config_path,
                output = ?output,
                metrics_out = ?metrics_out,
                "Starting crawl command"
            );
            commands::crawl(config, output, metrics_out).await?;
        }

        Commands::Topics { .. } => {
            commands::topics(&config)?;
        }
    }

    tracing::info!("kabar completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "kabar=debug,info".to_string()
    } else {
        format!("kabar={},warn", logging.level)
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&default_filter))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kabar=info,warn"));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .init();
        }
    }

    Ok(())
}
