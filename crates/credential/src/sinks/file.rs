//! JSON file sink
//!
//! Writes the new key pair as
//!
//! ```json
//! {"aws_access_key_id":"AKIA...","aws_secret_access_key":"...","username":"deploy-bot"}
//! ```
//!
//! The file is replaced atomically (temp file in the same directory, then
//! rename) and is readable by the owner only on Unix.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::core::{AccessKeyId, CredentialPair, SecretString, SinkError};
use crate::providers::{ConfigError, ProviderConfig};
use crate::traits::CredentialSink;

/// Default output file name
pub const DEFAULT_FILE_NAME: &str = "new-aws-access-key.json";

/// File sink configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSinkConfig {
    /// Output path; relative paths resolve against the working directory
    pub path: PathBuf,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE_NAME),
        }
    }
}

impl ProviderConfig for FileSinkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "filename".into(),
            });
        }
        if self.path.file_name().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "filename".into(),
                reason: format!("'{}' does not name a file", self.path.display()),
            });
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "file"
    }
}

#[derive(Serialize)]
struct KeyFileRef<'a> {
    aws_access_key_id: &'a str,
    aws_secret_access_key: &'a str,
    username: &'a str,
}

#[derive(Deserialize)]
struct KeyFile {
    aws_access_key_id: AccessKeyId,
    aws_secret_access_key: SecretString,
    username: String,
}

/// Sink writing the pair to a JSON file
#[derive(Clone, Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a sink from validated configuration
    pub fn from_config(config: FileSinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.path))
    }

    /// Target path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a pair previously written by this sink
    pub async fn read(path: impl AsRef<Path>) -> Result<CredentialPair, SinkError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file: KeyFile = serde_json::from_slice(&bytes)?;
        Ok(CredentialPair::new(
            file.aws_access_key_id,
            file.aws_secret_access_key,
            file.username,
        ))
    }
}

#[async_trait]
impl CredentialSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    #[tracing::instrument(skip(self, pair), fields(sink = "file", path = %self.path.display(), key_id = %pair.id))]
    async fn write(&self, pair: &CredentialPair) -> Result<(), SinkError> {
        let mut json = pair.secret.expose_secret(|secret| {
            serde_json::to_vec(&KeyFileRef {
                aws_access_key_id: pair.id.as_str(),
                aws_secret_access_key: secret,
                username: &pair.owner_username,
            })
        })?;

        let written = atomic_write(&self.path, &json).await;
        json.zeroize();
        written.map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Wrote key file");
        Ok(())
    }
}

/// Write via temp file + rename so readers never see a partial file
async fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp_path = path.with_file_name(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("key"),
        Uuid::new_v4().simple()
    ));

    if let Err(e) = write_private(&temp_path, data).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    Ok(())
}

async fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(path, data).await?;

    // 0600: owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}
