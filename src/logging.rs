use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "VERITY_LOG";

/// Filter used when `VERITY_LOG` is unset: `warn`, raised one level per `-v`.
pub fn default_directive(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. Stdout stays reserved for command output.
pub fn init(verbosity: u64) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
