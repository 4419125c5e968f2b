use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the log subscriber. Logs go to stderr; stdout carries console
/// bytes.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cbmemc=info,cbmemc_cli=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
