//! Key store trait

use async_trait::async_trait;

use crate::core::{AccessKeyId, CredentialPair, KeyRecord, KeyStoreError};

/// The mutable key set of a single identity
///
/// Implementations own transport concerns (timeouts, retries inside the SDK).
/// The rotation engine calls each method at most once per key per pass and
/// never concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use keyturn_credential::prelude::*;
///
/// #[async_trait]
/// impl KeyStore for MyStore {
///     async fn list(&self) -> Result<Vec<KeyRecord>, KeyStoreError> {
///         self.backend.keys().await
///     }
///     async fn delete(&self, id: &AccessKeyId) -> Result<(), KeyStoreError> {
///         self.backend.remove(id).await
///     }
///     async fn create(&self) -> Result<CredentialPair, KeyStoreError> {
///         self.backend.mint().await
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// List every key currently issued to the identity, in store order
    async fn list(&self) -> Result<Vec<KeyRecord>, KeyStoreError>;

    /// Delete one key
    ///
    /// Fails when the store rejects the id, including when it is in use.
    async fn delete(&self, id: &AccessKeyId) -> Result<(), KeyStoreError>;

    /// Mint a new key pair for the identity
    async fn create(&self) -> Result<CredentialPair, KeyStoreError>;
}
