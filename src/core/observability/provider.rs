use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit json lines instead of the human format
    pub json: bool,
    /// Optional daily-rotated log file alongside stdout
    pub file: Option<PathBuf>,
    /// Fraction of requests that get a root span, 0.0 to 1.0
    pub span_sample_rate: f32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
            span_sample_rate: 0.01,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                self.level
            ))?;

        if !(0.0..=1.0).contains(&self.span_sample_rate) {
            anyhow::bail!(
                "span_sample_rate must be between 0.0 and 1.0, got {}",
                self.span_sample_rate
            );
        }

        Ok(())
    }
}

/// Installs the global tracing subscriber. The returned guard keeps
/// the file writer flushing and must live until shutdown
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>, Error> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).context("invalid log filter")?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let name = path.file_name().unwrap_or(std::ffi::OsStr::new("sellside.log"));
            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LoggingConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_level_is_rejected() {
        let config = LoggingConfig {
            level: "shouty".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_rate_is_bounded() {
        let config = LoggingConfig {
            span_sample_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
