//! Log output for applications and tests.
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG`, falling back to
/// `info`. Only the first call in a process has any effect.
pub fn init() {
    init_with("info");
}

/// Like [`init`], with `directives` used when `RUST_LOG` is not set.
pub fn init_with(directives: &str) {
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
        // Another subscriber may already be installed by the host application.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
