//! Telemetry setup

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AppError;

/// Installs the global subscriber: stdout (json or pretty, from `LOG_FORMAT`)
/// plus a daily rolling file under `logs/`.
pub fn init_telemetry() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,library=debug,tower_http=info"));

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("library")
        .filename_suffix("log")
        .build("logs")
        .map_err(|e| AppError::TelemetryError(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format.as_str() {
        "pretty" => registry
            .with(fmt::layer().pretty().with_target(true))
            .with(fmt::layer().with_writer(file_appender).with_ansi(false))
            .try_init(),
        _ => registry
            .with(fmt::layer().json().with_target(true))
            .with(fmt::layer().json().with_writer(file_appender))
            .try_init(),
    }
    .map_err(|e| AppError::TelemetryError(e.to_string()))
}
