//! Keyturn Credential - IAM access key rotation
//!
//! Keeps the access keys of one identity inside an age and count policy.
//!
//! # Features
//!
//! - **Pure decisions** - classification and planning are side-effect free
//! - **Safe ordering** - the key in use is deleted only after its replacement
//!   reached every sink
//! - **Pluggable collaborators** - [`KeyStore`] and [`CredentialSink`] traits with
//!   IAM, file, AWS profile, CircleCI and in-memory implementations
//! - **Secret hygiene** - secrets are zeroized on drop and never logged
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use keyturn_credential::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(IamKeyStore::new(IamKeyStoreConfig::new("eu-west-1")).await?);
//! let current = store.current_access_key_id().await?;
//!
//! let rotator = Rotator::builder()
//!     .store(store)
//!     .sink(Arc::new(FileSink::new("new-aws-access-key.json")))
//!     .policy(RotationPolicy::new(30, 1)?)
//!     .build();
//!
//! let report = rotator.run(&current).await?;
//! println!("deleted {} key(s)", report.deleted.len());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

/// Core types, errors, and primitives
pub mod core;
/// Key store implementations and collaborator configuration
pub mod providers;
/// Classification, planning and execution of a rotation pass
pub mod rotation;
/// Credential sink implementations
pub mod sinks;
/// Collaborator traits
pub mod traits;
/// Secret and time helpers
pub mod utils;

// ── Root re-exports ─────────────────────────────────────────────────────────

pub use crate::core::{
    AccessKeyId, CredentialPair, KeyRecord, KeyStatus, KeyStoreError, SecretString, SinkError,
    ValidationError,
};
pub use crate::rotation::{ContractViolation, RotationError, RotationResult};
pub use crate::traits::{CredentialSink, KeyStore};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::core::{
        AccessKeyId, CredentialPair, KeyRecord, KeyStatus, KeyStoreError, SecretString, SinkError,
    };

    pub use crate::rotation::{
        ContractViolation, RotationError, RotationPolicy, RotationReport, RotationResult,
        RotationStage, Rotator,
    };

    pub use crate::traits::{CredentialSink, KeyStore};

    pub use crate::providers::{
        ConfigError, IamKeyStore, IamKeyStoreConfig, MemoryKeyStore, ProviderConfig,
    };

    pub use crate::sinks::{
        CircleCiSink, CircleCiSinkConfig, FileSink, FileSinkConfig, MemorySink, ProfileSink,
        ProfileSinkConfig,
    };
}
