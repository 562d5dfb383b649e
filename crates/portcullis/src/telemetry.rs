//! Subscriber installation for binaries and tests.
//!
//! The library crates only emit `tracing` events. Whoever owns `main`
//! decides where they go.

use portcullis_config::PortcullisConfig;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"info"` or `"portcullis_rbac=debug"`).
///
/// Returns `false` if a global subscriber was already set; the existing
/// one stays in place.
pub fn init_tracing(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(effective_filter(default_directive))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// [`init_tracing`] with `[logging] filter` as the fallback directive.
pub fn init_from_config(config: &PortcullisConfig) -> bool {
    init_tracing(&config.logging.filter)
}

/// The filter [`init_tracing`] would install, given the current `RUST_LOG`.
pub fn effective_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}
