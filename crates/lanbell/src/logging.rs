//! Logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize logging based on verbosity.
///
/// Logs go to stderr so the terminal stays usable for the served output.
/// A `RUST_LOG` value overrides the built-in filter.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        "lanbell=debug,lanbell_server=debug,lanbell_discover=debug,lanbell_net=debug,tower_http=debug"
    } else {
        "lanbell=info,lanbell_server=info,lanbell_discover=info,lanbell_net=info"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
