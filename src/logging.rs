//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the crate logs at `info`, or at
/// `debug` (including per-request HTTP traces) when `verbose` is set. Logs go
/// to stderr so command output on stdout stays machine-readable.
pub fn init(verbose: bool) {
    let default_directives = if verbose {
        "info,ppr_wallet=debug,tower_http=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
