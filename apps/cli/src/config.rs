//! Layered settings
//!
//! Built-in defaults, then the optional `--config` TOML file, then `KEYTURN_*`
//! environment variables, then command-line flags. Later layers win.

use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use keyturn_credential::prelude::*;
use keyturn_credential::rotation::{DEFAULT_MAX_AGE_DAYS, DEFAULT_MAX_KEY_COUNT};
use keyturn_credential::sinks::DEFAULT_FILE_NAME;
use keyturn_credential::sinks::circleci::DEFAULT_BASE_URL;
use keyturn_credential::utils::secret_string::REDACTED;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Prefix of the environment layer
pub const ENV_PREFIX: &str = "KEYTURN_";

/// Merged settings for one invocation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_age_days: u32,
    pub max_key_count: usize,
    pub region: String,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub filename: PathBuf,
    pub circleci_token: Option<String>,
    pub circleci_context_id: Option<String>,
    pub circleci_base_url: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("max_age_days", &self.max_age_days)
            .field("max_key_count", &self.max_key_count)
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("endpoint_url", &self.endpoint_url)
            .field("filename", &self.filename)
            .field("circleci_token", &self.circleci_token.as_ref().map(|_| REDACTED))
            .field("circleci_context_id", &self.circleci_context_id)
            .field("circleci_base_url", &self.circleci_base_url)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            max_key_count: DEFAULT_MAX_KEY_COUNT,
            region: String::new(),
            profile: None,
            endpoint_url: None,
            filename: PathBuf::from(DEFAULT_FILE_NAME),
            circleci_token: None,
            circleci_context_id: None,
            circleci_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Where the new key goes besides the key file
#[derive(Debug)]
pub enum SecondarySink {
    /// Local AWS CLI profile
    Profile(ProfileSinkConfig),
    /// CircleCI context
    CircleCi(CircleCiSinkConfig),
}

/// Settings split into validated collaborator configurations
#[derive(Debug)]
pub struct Resolved {
    pub policy: RotationPolicy,
    pub store: IamKeyStoreConfig,
    pub file: FileSinkConfig,
    pub secondary: SecondarySink,
}

/// Figment with every layer for `cli`
pub fn figment(cli: &Cli) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(path) = &cli.config {
        figment = figment.merge(Toml::file_exact(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).only(&ENV_KEYS))
        .merge(Serialized::defaults(cli))
}

const ENV_KEYS: [&str; 9] = [
    "max_age_days",
    "max_key_count",
    "region",
    "profile",
    "endpoint_url",
    "filename",
    "circleci_token",
    "circleci_context_id",
    "circleci_base_url",
];

/// Merge all layers into [`Settings`]
pub fn load(cli: &Cli) -> Result<Settings, figment::Error> {
    figment(cli).extract()
}

impl Settings {
    /// Validate and split into collaborator configurations
    ///
    /// Nothing here touches the network, so a bad invocation fails before
    /// any AWS call.
    pub fn resolve(self) -> anyhow::Result<Resolved> {
        let policy = RotationPolicy::new(self.max_age_days, self.max_key_count)?;

        let store = IamKeyStoreConfig {
            region: self.region,
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url,
        };
        store.validate()?;

        let file = FileSinkConfig {
            path: self.filename,
        };
        file.validate()?;

        let secondary = match self.circleci_token {
            Some(token) => {
                let context_id = self.circleci_context_id.ok_or(ConfigError::MissingRequired {
                    field: "circleci context id".into(),
                })?;
                let config = CircleCiSinkConfig::new(SecretString::new(token), context_id)
                    .with_base_url(self.circleci_base_url);
                config.validate()?;
                SecondarySink::CircleCi(config)
            }
            None => {
                let config = ProfileSinkConfig::resolve(self.profile);
                config.validate()?;
                SecondarySink::Profile(config)
            }
        };

        Ok(Resolved {
            policy,
            store,
            file,
            secondary,
        })
    }
}
