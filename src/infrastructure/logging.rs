//! Diagnostics for the scanner: console on stderr (stdout carries the beacon
//! report) and an optional rolling log file.

use crate::domain::settings::LogSettings;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keeps the file writer alive; drop it last so buffered lines are flushed.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

fn rotation_from(name: &str) -> Rotation {
    match name.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "minutely" => Rotation::MINUTELY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// `RUST_LOG` wins over the configured level; an unparsable level means `info`.
fn level_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_writer(settings: &LogSettings) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(
        rotation_from(&settings.rotation),
        &settings.log_dir,
        &settings.file_name_prefix,
    );
    tracing_appender::non_blocking(appender)
}

pub fn init_logger(settings: &LogSettings) -> anyhow::Result<LoggingGuard> {
    let console_layer = settings.console_logging_enabled.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(settings.show_target)
            .with_thread_ids(settings.show_thread_ids)
            .with_file(settings.show_file_line)
            .with_line_number(settings.show_file_line)
            .with_ansi(settings.ansi_colors)
    });

    let (file_layer, file_guard) = if settings.file_logging_enabled {
        let (writer, guard) = file_writer(settings);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(settings.show_target)
            .with_thread_ids(settings.show_thread_ids)
            .with_file(settings.show_file_line)
            .with_line_number(settings.show_file_line);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(level_filter(settings))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        "Logging initialized (level: {}, file: {})",
        settings.level,
        settings.file_logging_enabled
    );

    Ok(LoggingGuard { _file: file_guard })
}
