use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;

// In code use:
//
// use tracing::{trace, debug, info, warn, error};
//
// Verbosity comes from RUST_LOG, e.g. `RUST_LOG=autoencoder=debug,trainer=info`.

/// Install a compact stderr subscriber filtered by `RUST_LOG` (default `info`).
pub fn install_logger() -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
