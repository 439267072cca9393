//! Key store implementations
//!
//! - [`IamKeyStore`]: the caller's IAM access keys via the AWS SDK
//! - [`MemoryKeyStore`]: an in-process key set with failure injection

pub mod config;
pub mod iam;
pub mod memory;

pub use config::{ConfigError, ProviderConfig};
pub use iam::{IamKeyStore, IamKeyStoreConfig};
pub use memory::{DEFAULT_KEY_QUOTA, MemoryKeyStore, StoreCall};
