//! Key classification
//!
//! Partitions a listed key set into expired and valid keys. Pure: the same
//! keys, policy and `now` always give the same classification.

use chrono::{DateTime, Utc};

use super::error::ContractViolation;
use super::policy::RotationPolicy;
use crate::core::{AccessKeyId, KeyRecord};

/// A listed key with its derived age and current-ness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedKey {
    /// Metadata as listed
    pub record: KeyRecord,

    /// Whole days since creation
    pub age_days: u32,

    /// Whether the running process authenticated with this key
    pub is_current: bool,
}

impl ClassifiedKey {
    /// Key id
    pub fn id(&self) -> &AccessKeyId {
        &self.record.id
    }
}

/// Output of [`classify`]
///
/// Both sequences keep the listing order of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    current_id: AccessKeyId,

    /// Keys older than the policy allows
    pub expired: Vec<ClassifiedKey>,

    /// Keys within the age limit
    pub valid: Vec<ClassifiedKey>,
}

impl Classification {
    /// Id of the key the process authenticated with
    pub fn current_id(&self) -> &AccessKeyId {
        &self.current_id
    }

    /// Total number of classified keys
    pub fn len(&self) -> usize {
        self.expired.len() + self.valid.len()
    }

    /// Whether the store listed no keys
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.valid.is_empty()
    }

    /// The current key
    ///
    /// # Errors
    ///
    /// * `EmptyKeySet` if nothing was listed
    /// * `CurrentKeyMissing` if the listing does not contain the current id
    pub fn current(&self) -> Result<&ClassifiedKey, ContractViolation> {
        if self.is_empty() {
            return Err(ContractViolation::EmptyKeySet);
        }
        self.expired
            .iter()
            .chain(&self.valid)
            .find(|key| key.is_current)
            .ok_or_else(|| ContractViolation::CurrentKeyMissing {
                current_id: self.current_id.clone(),
            })
    }

    /// All keys, expired first
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedKey> {
        self.expired.iter().chain(&self.valid)
    }
}

/// Partition `keys` into expired and valid under `policy`
///
/// A key is expired iff its truncated age in days exceeds
/// `policy.max_age_days()`. The partition is exhaustive and disjoint.
///
/// An empty `keys` yields an empty classification; callers detect that
/// through [`Classification::current`].
pub fn classify(
    keys: &[KeyRecord],
    policy: &RotationPolicy,
    current_id: &AccessKeyId,
    now: DateTime<Utc>,
) -> Classification {
    let (expired, valid) = keys
        .iter()
        .map(|record| ClassifiedKey {
            age_days: record.age_days(now),
            is_current: &record.id == current_id,
            record: record.clone(),
        })
        .partition(|key| policy.is_expired(key.age_days));

    Classification {
        current_id: current_id.clone(),
        expired,
        valid,
    }
}
