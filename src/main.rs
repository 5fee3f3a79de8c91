use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

use mbean_pipeline::commands;
use mbean_pipeline::config;
use mbean_pipeline::error::Result;
use mbean_pipeline::logging;
use mbean_pipeline::server::{register_runtime_beans, ManagementServer};
use mbean_pipeline::MBeanServer;

#[derive(Parser, Debug)]
#[command(name = "mbean-pipeline")]
#[command(about = "In-process MBean server behind a priority-ordered filter pipeline", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (YAML/JSON/TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Run the management server until Ctrl-C (default)
    Run,
    /// Validate configuration and show the resulting filter chain
    Check {
        /// Print the filter chain as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing(args.debug, args.json_logs);

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            config::load_from_path(path).await
        }
        None => {
            info!("Loading configuration from default locations");
            config::load_from_env_or_file().await
        }
    };
    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match args.command.unwrap_or(Command::Run) {
        Command::Check { json } => commands::run_config_check(config, json).await?,
        Command::Run => run(config).await?,
    }

    Ok(())
}

async fn run(config: config::Config) -> Result<()> {
    let server = ManagementServer::new(config)?;
    register_runtime_beans(&server).await?;

    info!(
        "Serving {} MBeans in domains {:?}",
        server.get_mbean_count().await,
        server.get_domains().await
    );

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    server.shutdown().await;
    if let Some(metrics) = server.metrics() {
        info!("Final metrics:\n{}", metrics.gather_text()?);
    }

    Ok(())
}
