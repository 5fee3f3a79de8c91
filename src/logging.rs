use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` directives win over the
/// `debug` flag for anything they mention.
pub fn init_tracing(debug: bool, json: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mbean_pipeline={log_level}")));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
