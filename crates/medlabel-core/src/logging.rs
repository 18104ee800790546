//! Log output setup for host applications.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `level` is an env-filter directive such as `"info"` or
/// `"medlabel_core=debug"`; `RUST_LOG` wins when set. Returns `false` if a
/// subscriber was already installed.
#[uniffi::export]
pub fn init_logging(level: String) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
