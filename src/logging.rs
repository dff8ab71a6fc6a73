use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Installs the global subscriber. Returns false when one is already installed,
/// so every test may call this.
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_new(format!(
        "{level},hyper=warn,reqwest=info",
        level = config.level
    ))
    .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_test_writer(),
            )
            .try_init()
            .is_ok(),
    }
}
