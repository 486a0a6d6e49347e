use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging with a human-readable console layer and a
/// daily-rotated JSON file under `logs/`.
///
/// The returned guard must stay alive for the life of the process; dropping
/// it stops the background writer and loses buffered log lines.
pub fn init_logging() -> WorkerGuard {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "reconciler.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("vitals_reconciler=info".parse().unwrap()),
        )
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
