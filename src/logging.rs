use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, in `EnvFilter` syntax (`debug`, `runc=trace`, ...).
pub const LOG_ENV: &str = "RUNC_LOG";

/// Install the stderr logger. Calling it twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
