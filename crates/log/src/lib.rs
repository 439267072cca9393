//! # Keyturn Log
//!
//! Structured logging to stderr for keyturn binaries.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), keyturn_log::LogError> {
//!     let config = keyturn_log::Config::from_env()?;
//!     let _guard = keyturn_log::LoggerBuilder::from_config(config)
//!         .service("keyturn")
//!         .build()?;
//!
//!     tracing::info!(region = "eu-west-1", "starting rotation");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment
//!
//! - `KEYTURN_LOG` (or `RUST_LOG`): filter directive, default `info`
//! - `KEYTURN_LOG_FORMAT`: `pretty`, `compact` (default) or `json`; anything
//!   else is a configuration error

#![forbid(unsafe_code)]

mod builder;
mod config;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format, LOG_ENV, LOG_FORMAT_ENV};

/// Errors raised while installing the logger
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filter parsing error
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

