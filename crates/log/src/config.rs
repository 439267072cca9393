//! Configuration types and presets

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LogError, LogResult};

/// Environment variable holding the filter directive
pub const LOG_ENV: &str = "KEYTURN_LOG";

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "KEYTURN_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter directive (e.g., "info", "keyturn=debug,aws_config=warn")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, multi-line
    Pretty,
    /// Single line per event
    Compact,
    /// One JSON object per event
    Json,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show source location (file:line)
    pub source: bool,
    /// Show target module
    pub target: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Flatten JSON events
    pub flatten: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            display: DisplayConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            source: false,
            target: false,
            colors: std::io::IsTerminal::is_terminal(&std::io::stderr()),
            flatten: true,
        }
    }
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LogError::Config(format!(
                "unknown log format '{other}', expected pretty, compact or json"
            ))),
        }
    }
}

impl Config {
    /// Create configuration from `KEYTURN_LOG` / `RUST_LOG` and `KEYTURN_LOG_FORMAT`
    ///
    /// # Errors
    ///
    /// * `Config` if `KEYTURN_LOG_FORMAT` names an unknown format
    pub fn from_env() -> LogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LogResult<Self> {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_ENV).or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }

        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.format = format.parse()?;
            if config.format == Format::Json {
                config.display.colors = false;
            }
        }

        Ok(config)
    }

    /// Replace the filter directive
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_keyturn_log_wins_over_rust_log() {
        let config =
            Config::from_lookup(lookup(&[("KEYTURN_LOG", "debug"), ("RUST_LOG", "warn")])).unwrap();
        assert_eq!(config.level, "debug");

        let config = Config::from_lookup(lookup(&[("RUST_LOG", "warn")])).unwrap();
        assert_eq!(config.level, "warn");

        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.level, "info");
    }

    #[rstest]
    #[case("json", Format::Json)]
    #[case("PRETTY", Format::Pretty)]
    #[case("compact", Format::Compact)]
    fn test_format_from_env(#[case] value: &str, #[case] expected: Format) {
        let config = Config::from_lookup(lookup(&[("KEYTURN_LOG_FORMAT", value)])).unwrap();
        assert_eq!(config.format, expected);
    }

    #[test]
    fn test_json_disables_colors() {
        let config = Config::from_lookup(lookup(&[("KEYTURN_LOG_FORMAT", "json")])).unwrap();
        assert!(!config.display.colors);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = Config::from_lookup(lookup(&[("KEYTURN_LOG_FORMAT", "logfmt")])).unwrap_err();

        assert!(matches!(err, LogError::Config(_)));
        assert!(err.to_string().contains("logfmt"), "{err}");
    }
}
