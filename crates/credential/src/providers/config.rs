//! Collaborator configuration trait and error types

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    #[error("Missing required configuration: {field}")]
    MissingRequired { field: String },

    /// Configuration validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingRequired {
            field: field.to_string(),
        }
    }
}

/// Trait for key store and sink configuration
///
/// Every collaborator config is validated before the collaborator is built.
///
/// # Contract
///
/// - `validate()` checks every parameter and names the offending field
/// - `provider_name()` returns a static name used in logs
///
/// # Example
///
/// ```rust,ignore
/// use keyturn_credential::providers::{ConfigError, ProviderConfig};
///
/// impl ProviderConfig for MySinkConfig {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.target.is_empty() {
///             return Err(ConfigError::MissingRequired {
///                 field: "target".into(),
///             });
///         }
///         Ok(())
///     }
///
///     fn provider_name(&self) -> &'static str {
///         "my-sink"
///     }
/// }
/// ```
pub trait ProviderConfig: Send + Sync + Clone {
    /// Validate configuration parameters
    fn validate(&self) -> Result<(), ConfigError>;

    /// Name identifying the collaborator in logs
    fn provider_name(&self) -> &'static str;
}

/// Require `value` to be a non-blank string
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing(field));
    }
    Ok(())
}

/// Require `value` to be an absolute `http(s)` URL
pub(crate) fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .ok_or_else(|| ConfigError::invalid(field, "must start with http:// or https://"))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::invalid(field, "missing host"));
    }
    Ok(())
}
