use bookstore_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// `BOOKSTORE_LOG` takes a full filter directive and wins over the configured
/// level. Events are written to stderr; stdout belongs to the menu.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env("BOOKSTORE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // Keeps the first subscriber if one is already installed.
    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
