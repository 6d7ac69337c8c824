use std::io::IsTerminal;

use audit_config::log::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Installs the global subscriber. Logs are written to stderr so that the
/// command output on stdout stays clean. The guard must be held until exit.
pub fn configure_logging(config: &LoggingConfig) -> WorkerGuard {
    let stderr_stream = std::io::stderr();
    let is_terminal = stderr_stream.is_terminal();
    let (writer, guard) = tracing_appender::non_blocking(stderr_stream);
    let filter = EnvFilter::new(config.env_filter_str());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let timer = UtcTime::rfc_3339();

    let layer = match config.format {
        LogFormat::Json => fmt_layer
            .json()
            .with_timer(timer)
            .with_thread_ids(false)
            .with_target(false)
            .with_ansi(false)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt_layer
            .compact()
            .with_thread_ids(false)
            .with_timer(timer)
            .with_target(false)
            .with_ansi(is_terminal)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).init();

    guard
}
