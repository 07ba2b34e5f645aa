use girder_core::GirderError;
use girder_core::settings::{AppConfig, LoggingConfig};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Build the subscriber for a logger mode.
///
/// - `production`  — JSON lines.
/// - `development` — human-readable output.
/// - `nop`         — no subscriber at all (`None`).
///
/// Anything else is rejected, matching the behavior of a fixed
/// mode-to-constructor table.
pub fn subscriber_for_mode(
    mode: &str,
) -> Result<Option<Box<dyn Subscriber + Send + Sync>>, GirderError> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    match mode {
        "production" => Ok(Some(Box::new(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter())
                .with_target(false)
                .finish(),
        ))),
        "development" => Ok(Some(Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .finish(),
        ))),
        "nop" => Ok(None),
        other => Err(GirderError::UnknownLoggerMode(other.to_string())),
    }
}

/// Install the configured global logger and announce the app identity.
///
/// Call once at startup. With mode `nop` nothing is installed.
pub fn init_logger(app: &AppConfig, logging: &LoggingConfig) -> Result<(), GirderError> {
    let Some(subscriber) = subscriber_for_mode(&logging.mode)? else {
        return Ok(());
    };
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| GirderError::Internal(format!("could not install logger: {e}")))?;
    tracing::info!(
        app_name = %app.name,
        app_version = %app.version,
        environment = %app.environment,
        "Logger initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_and_development_modes_build() {
        assert!(subscriber_for_mode("production").unwrap().is_some());
        assert!(subscriber_for_mode("development").unwrap().is_some());
    }

    #[test]
    fn nop_mode_builds_nothing() {
        assert!(subscriber_for_mode("nop").unwrap().is_none());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = subscriber_for_mode("verbose").err().unwrap();
        assert_eq!(err.to_string(), "Unknown logger mode: verbose");
    }
}
