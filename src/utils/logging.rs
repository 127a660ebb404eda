use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. Logs go to stderr so reports on stdout stay
/// machine readable.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(crate::utils::consts::LOG_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_thread_names(true)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
