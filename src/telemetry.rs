use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize logging: `RUST_LOG`-style filter (default `roundsmith=info`) and
/// a formatted stdout layer. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roundsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
