//! Core types for access key rotation

mod error;
mod key;
mod pair;

pub use error::{KeyStoreError, SinkError, ValidationError};
pub use key::{AccessKeyId, KeyRecord, KeyStatus};
pub use pair::CredentialPair;

// Re-exports from utils
pub use crate::utils::{SecretString, age_in_days};
