//! Credential sink trait

use async_trait::async_trait;

use crate::core::{CredentialPair, SinkError};

/// A destination that must receive a newly created key pair
///
/// Sinks are written in configured order. A sink must not log the secret.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialSink: Send + Sync {
    /// Short name used in logs and error context (`file`, `profile`, `circleci`)
    fn name(&self) -> &'static str;

    /// Persist the pair
    async fn write(&self, pair: &CredentialPair) -> Result<(), SinkError>;
}
