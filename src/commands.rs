use crate::config::Config;
use crate::error::Result;
use crate::server::ManagementServer;
use tracing::info;

/// Validates `config`, assembles the server it describes and reports the
/// resulting filter order. With `json`, the order is printed to stdout.
pub async fn run_config_check(config: Config, json: bool) -> Result<()> {
    info!("Checking configuration...");

    crate::config::validate(&config)?;
    info!("✓ Configuration is valid");

    let server = ManagementServer::new(config)?;
    let pipeline = server.pipeline();
    let filters = pipeline.filters();

    info!("Default domain: {}", server.config().server.default_domain);
    info!("Minimum filter priority: > {}", pipeline.min_priority());
    info!("Filter chain ({} filters):", filters.len());
    for (position, filter) in filters.iter().enumerate() {
        info!(
            "  {}. {} (priority {})",
            position + 1,
            filter.name,
            filter.priority
        );
    }
    info!("  -> terminal MBean server");

    if json {
        println!("{}", serde_json::to_string_pretty(&filters)?);
    }

    server.shutdown().await;
    info!("✓ Check complete");
    Ok(())
}
