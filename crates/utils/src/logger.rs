use tracing_forest::ForestLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Installs the process-wide tracing subscriber: `tracing-forest`'s
/// indented span tree, filtered by `RUST_LOG` (defaulting to `info`).
/// Safe to call more than once — later calls are no-ops, since a
/// global subscriber can only be set once per process.
pub fn setup_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(env_filter).with(ForestLayer::default());
    let _ = subscriber.try_init();
}
