//! Newly minted credential material

use std::fmt;

use crate::core::AccessKeyId;
use crate::utils::SecretString;

/// A freshly created access key pair
///
/// Exists only between [`KeyStore::create`](crate::traits::KeyStore::create)
/// and the last sink write. `Debug` never prints the secret.
#[derive(Clone)]
pub struct CredentialPair {
    /// Access key id
    pub id: AccessKeyId,

    /// Secret access key
    pub secret: SecretString,

    /// IAM user the key was issued to
    pub owner_username: String,
}

impl CredentialPair {
    /// Create a new credential pair
    pub fn new(id: AccessKeyId, secret: SecretString, owner_username: impl Into<String>) -> Self {
        Self {
            id,
            secret,
            owner_username: owner_username.into(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("id", &self.id)
            .field("owner_username", &self.owner_username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_omits_secret() {
        let pair = CredentialPair::new(
            AccessKeyId::new("AKIANEW").unwrap(),
            SecretString::new("do-not-print-me"),
            "deploy-bot",
        );
        let debug = format!("{pair:?}");
        assert!(debug.contains("AKIANEW"));
        assert!(debug.contains("deploy-bot"));
        assert!(!debug.contains("do-not-print-me"));
    }
}
