use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "sigma_os_lib=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("logging initialised");
    }
}
