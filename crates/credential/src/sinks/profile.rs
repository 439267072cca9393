//! Local AWS profile sink
//!
//! Updates a shared-credentials profile through the AWS CLI:
//!
//! ```text
//! aws configure set aws_access_key_id <id> --profile <profile>
//! aws configure set aws_secret_access_key <secret> --profile <profile>
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::core::{CredentialPair, SinkError};
use crate::providers::config::require_non_blank;
use crate::providers::{ConfigError, ProviderConfig};
use crate::traits::CredentialSink;

/// Program invoked by default
pub const DEFAULT_PROGRAM: &str = "aws";

/// Profile used when neither the config nor `AWS_PROFILE` names one
pub const DEFAULT_PROFILE: &str = "default";

/// Profile sink configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSinkConfig {
    /// Executable implementing `configure set`
    pub program: String,

    /// Profile to update
    pub profile: String,
}

impl ProfileSinkConfig {
    /// Configuration for `profile`, or `AWS_PROFILE`, or `default`
    pub fn resolve(profile: Option<String>) -> Self {
        let profile = profile
            .filter(|p| !p.trim().is_empty())
            .or_else(|| std::env::var("AWS_PROFILE").ok().filter(|p| !p.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        Self {
            program: DEFAULT_PROGRAM.to_string(),
            profile,
        }
    }
}

impl Default for ProfileSinkConfig {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl ProviderConfig for ProfileSinkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("program", &self.program)?;
        require_non_blank("profile", &self.profile)?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "profile"
    }
}

/// Sink updating a local AWS CLI profile
#[derive(Clone, Debug)]
pub struct ProfileSink {
    config: ProfileSinkConfig,
}

impl ProfileSink {
    /// Create a sink from validated configuration
    pub fn new(config: ProfileSinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Profile being updated
    pub fn profile(&self) -> &str {
        &self.config.profile
    }

    async fn configure_set(&self, key: &str, value: &str) -> Result<(), SinkError> {
        let output = Command::new(&self.config.program)
            .args(["configure", "set", key, value, "--profile"])
            .arg(&self.config.profile)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SinkError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let captured = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout)
        } else {
            stderr
        };

        Err(SinkError::Command {
            program: self.config.program.clone(),
            status: output.status.to_string(),
            output: captured.trim().to_string(),
        })
    }
}

#[async_trait]
impl CredentialSink for ProfileSink {
    fn name(&self) -> &'static str {
        "profile"
    }

    #[tracing::instrument(skip(self, pair), fields(sink = "profile", profile = %self.config.profile, key_id = %pair.id))]
    async fn write(&self, pair: &CredentialPair) -> Result<(), SinkError> {
        self.configure_set("aws_access_key_id", pair.id.as_str())
            .await?;

        let secret = pair.secret.to_zeroizing();
        self.configure_set("aws_secret_access_key", &secret)
            .await?;

        tracing::debug!("Updated local profile");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_profile_wins() {
        let config = ProfileSinkConfig::resolve(Some("ci".into()));
        assert_eq!(config.profile, "ci");
        assert_eq!(config.program, "aws");
    }

    #[test]
    fn test_blank_program_rejected() {
        let config = ProfileSinkConfig {
            program: String::new(),
            profile: "ci".into(),
        };
        assert!(matches!(
            ProfileSink::new(config),
            Err(ConfigError::MissingRequired { field }) if field == "program"
        ));
    }
}
