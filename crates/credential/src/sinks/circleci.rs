//! CircleCI context sink
//!
//! Stores the new pair as the `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`
//! environment variables of a CircleCI context, one `PUT` each:
//!
//! ```text
//! PUT {base_url}/api/v2/context/{context_id}/environment-variable/{NAME}
//! content-type: application/json
//! authorization: Basic <token>
//!
//! {"value": "..."}
//! ```
//!
//! Only HTTP 200 counts as success; anything else fails with the response
//! body.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{CredentialPair, SecretString, SinkError};
use crate::providers::config::{require_http_url, require_non_blank};
use crate::providers::{ConfigError, ProviderConfig};
use crate::traits::CredentialSink;

/// Public CircleCI API
pub const DEFAULT_BASE_URL: &str = "https://circleci.com";

/// Context variable holding the access key id
pub const KEY_VARIABLE: &str = "AWS_ACCESS_KEY_ID";

/// Context variable holding the secret access key
pub const SECRET_VARIABLE: &str = "AWS_SECRET_ACCESS_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// CircleCI sink configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircleCiSinkConfig {
    /// API token, sent as `authorization: Basic <token>`
    pub token: SecretString,

    /// Context receiving the variables
    pub context_id: String,

    /// API origin
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    ///
    /// **Validation**: between 1 and 60 seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CircleCiSinkConfig {
    /// Configuration against the public API with the default timeout
    pub fn new(token: SecretString, context_id: impl Into<String>) -> Self {
        Self {
            token,
            context_id: context_id.into(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the API origin
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ProviderConfig for CircleCiSinkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_blank() {
            return Err(ConfigError::MissingRequired {
                field: "circleci token".into(),
            });
        }

        require_non_blank("circleci context id", &self.context_id)?;
        if !self
            .context_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::InvalidValue {
                field: "circleci context id".into(),
                reason: "may only contain letters, digits and '-'".into(),
            });
        }

        require_http_url("circleci base url", &self.base_url)?;

        if !(1..=60).contains(&self.timeout_secs) {
            return Err(ConfigError::InvalidValue {
                field: "circleci timeout".into(),
                reason: format!(
                    "must be between 1 and 60 seconds, got {} seconds",
                    self.timeout_secs
                ),
            });
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "circleci"
    }
}

#[derive(Serialize)]
struct ContextValue<'a> {
    value: &'a str,
}

/// Sink updating a CircleCI context
#[derive(Clone, Debug)]
pub struct CircleCiSink {
    client: reqwest::Client,
    config: CircleCiSinkConfig,
}

impl CircleCiSink {
    /// Create a sink from validated configuration
    ///
    /// # Errors
    ///
    /// * `ConfigError` if the configuration is invalid or the HTTP client
    ///   cannot be built
    pub fn new(config: CircleCiSinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::ValidationFailed(format!("http client: {e}")))?;

        Ok(Self { client, config })
    }

    fn variable_url(&self, name: &str) -> String {
        format!(
            "{}/api/v2/context/{}/environment-variable/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.context_id,
            name
        )
    }

    async fn put_variable(&self, name: &'static str, value: &str) -> Result<(), SinkError> {
        let authorization = self
            .config
            .token
            .expose_secret(|token| format!("Basic {token}"));

        let response = self
            .client
            .put(self.variable_url(name))
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&ContextValue { value })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            tracing::debug!(variable = name, "Updated context variable");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Http {
            variable: name,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CredentialSink for CircleCiSink {
    fn name(&self) -> &'static str {
        "circleci"
    }

    #[tracing::instrument(skip(self, pair), fields(sink = "circleci", context = %self.config.context_id, key_id = %pair.id))]
    async fn write(&self, pair: &CredentialPair) -> Result<(), SinkError> {
        self.put_variable(KEY_VARIABLE, pair.id.as_str()).await?;

        let secret = pair.secret.to_zeroizing();
        self.put_variable(SECRET_VARIABLE, &secret).await?;

        Ok(())
    }
}
