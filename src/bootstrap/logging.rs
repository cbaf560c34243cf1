use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,bucketsync=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn initialize() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
