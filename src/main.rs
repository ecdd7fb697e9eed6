use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use remitscan::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the comparison API server
    Serve,
    /// Ingest a Remittance Prices Worldwide CSV export
    Load {
        /// Path to the CSV file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Serve) => remitscan::run_serve(cli.config_path.as_deref()).await,
        Some(Commands::Load { file }) => {
            remitscan::run_load(cli.config_path.as_deref(), &file).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = remitscan::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
server:
  bind_addr: "127.0.0.1:8000"
  cors_origins:
    - "http://localhost:3000"

providers:
  exchange_rate:
    base_url: "https://v6.exchangerate-api.com"
    # api_key: "your-key"   # or set EXCHANGE_RATE_API_KEY in the environment

rates:
  fallback_rate: 83.0
  timeout_secs: 5
  cache_ttl_secs: 300

# data_path: "/var/lib/remitscan"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
