use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PD_LOG";

/// Installs the stderr subscriber. `PD_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "pipedemo=info"
    } else {
        "pipedemo=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
