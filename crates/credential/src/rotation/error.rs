//! Rotation-specific error types
//!
//! Every error here is fatal to the pass. Collaborator errors are wrapped with
//! the stage they happened in so the operator can tell which step failed.

use thiserror::Error;

use super::state::RotationStage;
use crate::core::{AccessKeyId, KeyStoreError, SinkError};

/// Broken assumptions about the listed key set
///
/// The current key must always be part of the identity's key set. When it is
/// not, something upstream is wrong (wrong identity, wrong account, stale
/// credentials) and minting a key would only hide it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// Listing returned no keys at all
    #[error("the key store returned no access keys; the current key must always be listed")]
    EmptyKeySet,

    /// The current key is not among the listed keys
    #[error("current access key '{current_id}' is not in the identity's key set")]
    CurrentKeyMissing {
        /// Id the process authenticated with
        current_id: AccessKeyId,
    },
}

/// Errors that can occur during a rotation pass
#[derive(Debug, Error)]
pub enum RotationError {
    /// Policy validation failed
    #[error("Invalid rotation policy: {reason}")]
    InvalidPolicy { reason: String },

    /// Listed key set breaks an engine invariant
    #[error("Contract violation: {0}")]
    ContractViolation(#[from] ContractViolation),

    /// Stage transition is not allowed
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: RotationStage,
        to: RotationStage,
    },

    /// Listing keys failed
    #[error("Failed to list access keys: {0}")]
    List(#[source] KeyStoreError),

    /// Deleting a key failed
    #[error("Failed to delete access key '{key_id}' (stage {stage}): {source}")]
    Delete {
        key_id: AccessKeyId,
        stage: RotationStage,
        #[source]
        source: KeyStoreError,
    },

    /// A replacement is due but nothing could receive it
    #[error("A new access key is required but no credential sinks are configured")]
    NoSinks,

    /// Creating the replacement failed
    #[error("Failed to create a new access key: {0}{hint}", hint = create_hint(.0))]
    Create(#[source] KeyStoreError),

    /// A sink rejected the replacement
    #[error("Failed to persist new access key '{key_id}' to {sink} sink: {source}")]
    Persist {
        sink: &'static str,
        key_id: AccessKeyId,
        #[source]
        source: SinkError,
    },
}

impl RotationError {
    /// The stage the pass was trying to reach when it failed
    ///
    /// `None` for errors raised before a pass starts (policy validation).
    pub fn stage(&self) -> Option<RotationStage> {
        match self {
            Self::InvalidPolicy { .. } => None,
            Self::ContractViolation(_) => Some(RotationStage::Classified),
            Self::InvalidStateTransition { to, .. } => Some(*to),
            Self::List(_) => Some(RotationStage::Listed),
            Self::Delete { stage, .. } => Some(*stage),
            Self::NoSinks => Some(RotationStage::Planned),
            Self::Create(_) => Some(RotationStage::Created),
            Self::Persist { .. } => Some(RotationStage::Persisted),
        }
    }
}

// A key minted by a pass whose persistence failed stays valid and keeps the
// identity at quota on every later pass.
fn create_hint(source: &KeyStoreError) -> &'static str {
    match source {
        KeyStoreError::LimitExceeded => {
            "; delete the unused access key left by an earlier pass \
             (aws iam delete-access-key) and run again"
        }
        _ => "",
    }
}

/// Result type for rotation operations
pub type RotationResult<T> = Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_collaborator_errors() {
        let err = RotationError::List(KeyStoreError::LimitExceeded);
        assert_eq!(err.stage(), Some(RotationStage::Listed));

        let err = RotationError::Delete {
            key_id: AccessKeyId::new("AKIAOLD").unwrap(),
            stage: RotationStage::Finalized,
            source: KeyStoreError::InUse {
                id: "AKIAOLD".into(),
            },
        };
        assert_eq!(err.stage(), Some(RotationStage::Finalized));
        assert!(err.to_string().contains("AKIAOLD"));
        assert!(err.to_string().contains("finalized"));
    }

    #[test]
    fn test_quota_error_tells_operator_what_to_do() {
        let err = RotationError::Create(KeyStoreError::LimitExceeded);
        assert!(err.to_string().contains("delete-access-key"), "{err}");

        let err = RotationError::Create(KeyStoreError::Request {
            operation: "create",
            message: "throttled".into(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to create a new access key: create request failed: throttled"
        );
    }

    #[test]
    fn test_contract_violation_is_distinct() {
        let err: RotationError = ContractViolation::EmptyKeySet.into();
        assert!(matches!(
            err,
            RotationError::ContractViolation(ContractViolation::EmptyKeySet)
        ));
        assert_eq!(err.stage(), Some(RotationStage::Classified));
    }

    #[test]
    fn test_policy_error_has_no_stage() {
        let err = RotationError::InvalidPolicy {
            reason: "max key count must be at least 1".into(),
        };
        assert_eq!(err.stage(), None);
    }
}
