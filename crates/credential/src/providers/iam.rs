//! AWS IAM key store
//!
//! Operates on the access keys of the identity the process authenticates as.
//! No user name is ever sent, so IAM resolves the caller from the request
//! signature.
//!
//! # Configuration
//!
//! ```rust,ignore
//! use keyturn_credential::providers::{IamKeyStore, IamKeyStoreConfig};
//!
//! let config = IamKeyStoreConfig {
//!     region: "eu-west-1".into(),
//!     profile: Some("ci".into()),
//!     endpoint_url: Some("http://localhost:4566".into()),
//! };
//!
//! let store = IamKeyStore::new(config).await?;
//! let current = store.current_access_key_id().await?;
//! ```

use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_iam::Client as IamClient;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::primitives::DateTime as SmithyDateTime;
use aws_sdk_iam::types::{AccessKeyMetadata, StatusType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AccessKeyId, CredentialPair, KeyRecord, KeyStatus, KeyStoreError, SecretString};
use crate::providers::config::{ConfigError, ProviderConfig, require_http_url, require_non_blank};
use crate::traits::KeyStore;

/// IAM key store configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamKeyStoreConfig {
    /// AWS region (required, never auto-detected)
    pub region: String,

    /// Shared config profile to load credentials from
    ///
    /// `None` uses the default credential chain.
    pub profile: Option<String>,

    /// Custom endpoint URL (LocalStack and other IAM-compatible services)
    pub endpoint_url: Option<String>,
}

impl IamKeyStoreConfig {
    /// Configuration for a region with the default credential chain
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }
}

impl ProviderConfig for IamKeyStoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("region", &self.region)?;

        if let Some(profile) = &self.profile {
            require_non_blank("profile", profile)?;
        }

        if let Some(endpoint) = &self.endpoint_url {
            require_http_url("endpoint_url", endpoint)?;
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "iam"
    }
}

/// Key store backed by AWS IAM
#[derive(Clone)]
pub struct IamKeyStore {
    client: IamClient,
    credentials: Option<SharedCredentialsProvider>,
    config: IamKeyStoreConfig,
}

impl std::fmt::Debug for IamKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamKeyStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IamKeyStore {
    /// Create a store from validated configuration
    ///
    /// Loads the SDK configuration with the default credential chain,
    /// narrowed to `profile` when set.
    ///
    /// # Errors
    ///
    /// * `ConfigError` if the configuration is invalid
    pub async fn new(config: IamKeyStoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let client = IamClient::new(&sdk_config);

        tracing::info!(
            provider = config.provider_name(),
            region = %config.region,
            profile = ?config.profile,
            endpoint = ?config.endpoint_url,
            "Initialized IAM key store"
        );

        Ok(Self {
            client,
            credentials: sdk_config.credentials_provider(),
            config,
        })
    }

    /// Configuration the store was built with
    pub fn config(&self) -> &IamKeyStoreConfig {
        &self.config
    }

    /// Access key id the SDK signs requests with
    ///
    /// # Errors
    ///
    /// * `Credentials` if no provider is configured or it cannot resolve
    ///   credentials
    #[tracing::instrument(skip(self))]
    pub async fn current_access_key_id(&self) -> Result<AccessKeyId, KeyStoreError> {
        let provider = self.credentials.as_ref().ok_or_else(|| {
            KeyStoreError::Credentials("no credentials provider configured".to_string())
        })?;

        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| KeyStoreError::Credentials(DisplayErrorContext(&e).to_string()))?;

        AccessKeyId::new(credentials.access_key_id())
            .map_err(|e| KeyStoreError::Credentials(e.to_string()))
    }
}

#[async_trait]
impl KeyStore for IamKeyStore {
    #[tracing::instrument(skip(self), fields(provider = "iam"))]
    async fn list(&self) -> Result<Vec<KeyRecord>, KeyStoreError> {
        let mut keys = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_access_keys()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| KeyStoreError::Request {
                    operation: "list",
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            for metadata in output.access_key_metadata() {
                keys.push(to_record(metadata)?);
            }

            match output.marker() {
                Some(next) if output.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        tracing::debug!(count = keys.len(), "Listed access keys");
        Ok(keys)
    }

    #[tracing::instrument(skip(self), fields(provider = "iam", key_id = %id))]
    async fn delete(&self, id: &AccessKeyId) -> Result<(), KeyStoreError> {
        self.client
            .delete_access_key()
            .access_key_id(id.as_str())
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service) if service.is_no_such_entity_exception() => KeyStoreError::NotFound {
                    id: id.to_string(),
                },
                _ => KeyStoreError::Request {
                    operation: "delete",
                    message: DisplayErrorContext(&e).to_string(),
                },
            })?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(provider = "iam"))]
    async fn create(&self) -> Result<CredentialPair, KeyStoreError> {
        let output = self
            .client
            .create_access_key()
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service) if service.is_limit_exceeded_exception() => {
                    KeyStoreError::LimitExceeded
                }
                _ => KeyStoreError::Request {
                    operation: "create",
                    message: DisplayErrorContext(&e).to_string(),
                },
            })?;

        let key = output
            .access_key()
            .ok_or_else(|| malformed("create", "response carries no access key"))?;

        let id = AccessKeyId::new(key.access_key_id())
            .map_err(|e| malformed("create", e.to_string()))?;

        Ok(CredentialPair::new(
            id,
            SecretString::new(key.secret_access_key()),
            key.user_name(),
        ))
    }
}

fn to_record(metadata: &AccessKeyMetadata) -> Result<KeyRecord, KeyStoreError> {
    let id = metadata
        .access_key_id()
        .ok_or_else(|| malformed("list", "access key without id"))?;
    let id = AccessKeyId::new(id).map_err(|e| malformed("list", e.to_string()))?;

    let created_at = metadata
        .create_date()
        .ok_or_else(|| malformed("list", format!("access key '{id}' without creation date")))
        .and_then(|date| {
            to_chrono(date).ok_or_else(|| {
                malformed("list", format!("access key '{id}' has an out-of-range creation date"))
            })
        })?;

    let status = match metadata.status() {
        Some(StatusType::Active) => KeyStatus::Active,
        Some(StatusType::Inactive) => KeyStatus::Inactive,
        _ => KeyStatus::Unknown,
    };

    let mut record = KeyRecord::new(id, created_at).with_status(status);
    if let Some(user) = metadata.user_name() {
        record = record.with_user_name(user);
    }
    Ok(record)
}

fn to_chrono(date: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}

fn malformed(operation: &'static str, reason: impl Into<String>) -> KeyStoreError {
    KeyStoreError::MalformedResponse {
        operation,
        reason: reason.into(),
    }
}
