//! Logger builder implementation

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
    service: Option<String>,
}

/// Guard that keeps the logger's root span entered
///
/// The global subscriber stays installed after the guard is dropped; only the
/// root span is exited.
#[derive(Debug)]
#[must_use = "dropping the guard exits the root span"]
pub struct LoggerGuard {
    _root_span: Option<tracing::span::EnteredSpan>,
}

/// Build a fmt layer writing to stderr with the display options applied
macro_rules! stderr_layer {
    ($layer:expr, $display:expr) => {
        $layer
            .with_writer(std::io::stderr)
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
    };
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            service: None,
        }
    }

    /// Enter an `app` span carrying `service` for the guard's lifetime
    #[must_use]
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// * `Filter` if the level directive cannot be parsed
    /// * `AlreadyInitialized` if a global subscriber is already set
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {e}", self.config.level)))?;
        let display = &self.config.display;
        let registry = Registry::default().with(filter);

        let installed = match self.config.format {
            Format::Pretty => registry
                .with(stderr_layer!(tracing_subscriber::fmt::layer().pretty(), display))
                .try_init(),
            Format::Compact => registry
                .with(stderr_layer!(tracing_subscriber::fmt::layer().compact(), display))
                .try_init(),
            Format::Json => registry
                .with(stderr_layer!(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .flatten_event(display.flatten)
                        .with_current_span(true)
                        .with_span_list(false),
                    display
                ))
                .try_init(),
        };
        installed.map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        let root_span = self.service.map(|service| {
            tracing::info_span!("app", service = %service, version = env!("CARGO_PKG_VERSION"))
                .entered()
        });

        Ok(LoggerGuard {
            _root_span: root_span,
        })
    }
}
