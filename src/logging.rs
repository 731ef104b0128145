use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize structured logging for the CLI.
///
/// Defaults to `warn` so transcript output and progress bars stay readable;
/// override with `MURMUR_LOG` (standard `EnvFilter` syntax).
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var("MURMUR_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
