//! Tracing setup: stdout logs plus an optional rolling file appender.

use tracing_subscriber::{fmt::time::UtcTime, prelude::*, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the global tracing subscriber from the logging config.
///
/// Filter precedence: `logging.level` from config, then `RUST_LOG`, then
/// "info". When file logging is enabled, a rolling appender is layered on
/// top of the stdout logs; if the log directory cannot be created the
/// server keeps running with stdout logs only.
pub fn init_with_config(cfg: &LoggingConfig) {
    let env_filter = match &cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let stdout_layer = match cfg.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(std::io::stdout)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(std::io::stdout)
            .boxed(),
    };

    let file_layer = cfg
        .enable_file_logging
        .then(|| build_file_writer(cfg))
        .flatten()
        .map(|writer| match cfg.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(writer)
                .boxed(),
            LogFormat::Text => tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(writer)
                .boxed(),
        });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}

fn build_file_writer(cfg: &LoggingConfig) -> Option<tracing_appender::non_blocking::NonBlocking> {
    let rotation = match cfg.rotation.to_lowercase().as_str() {
        "hourly" => tracing_appender::rolling::Rotation::HOURLY,
        "never" => tracing_appender::rolling::Rotation::NEVER,
        _ => tracing_appender::rolling::Rotation::DAILY,
    };

    if std::fs::create_dir_all(&cfg.dir).is_err() {
        eprintln!(
            "failed to create log directory '{}', falling back to stdout logs",
            cfg.dir
        );
        return None;
    }

    let appender =
        tracing_appender::rolling::RollingFileAppender::new(rotation, &cfg.dir, &cfg.filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The guard flushes the buffered writer on drop; keep it for the
    // lifetime of the process.
    Box::leak(Box::new(guard));

    Some(writer)
}
