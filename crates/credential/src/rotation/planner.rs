//! Rotation planning
//!
//! Turns a classification into the list of keys to delete and whether a
//! replacement has to be minted. Pure and idempotent.

use super::classifier::{Classification, ClassifiedKey};
use super::error::ContractViolation;
use crate::core::AccessKeyId;

/// What a pass will do to the key set
///
/// Built only by [`plan`], which guarantees:
/// - the current key appears in `to_delete` at most once, as the last entry;
/// - `create_replacement` is true iff the current key is expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    to_delete: Vec<ClassifiedKey>,
    create_replacement: bool,
}

impl RotationPlan {
    /// Keys to delete, in execution order
    pub fn to_delete(&self) -> &[ClassifiedKey] {
        &self.to_delete
    }

    /// Whether a new key must be created
    pub fn create_replacement(&self) -> bool {
        self.create_replacement
    }

    /// Keys deleted before creation (everything but the current key)
    pub fn room_to_make(&self) -> &[ClassifiedKey] {
        match self.deferred_current() {
            Some(_) => &self.to_delete[..self.to_delete.len() - 1],
            None => &self.to_delete,
        }
    }

    /// The current key, when it is scheduled for deletion after persistence
    pub fn deferred_current(&self) -> Option<&ClassifiedKey> {
        self.to_delete.last().filter(|key| key.is_current)
    }

    /// Whether the pass has nothing to do
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && !self.create_replacement
    }

    /// Split into the owned pre-creation deletions and the deferred current key
    pub(crate) fn into_parts(self) -> (Vec<ClassifiedKey>, Option<ClassifiedKey>, bool) {
        let mut to_delete = self.to_delete;
        let deferred = match to_delete.last() {
            Some(last) if last.is_current => to_delete.pop(),
            _ => None,
        };
        (to_delete, deferred, self.create_replacement)
    }
}

impl Classification {
    /// Plan this classification under a key count ceiling
    pub fn plan(&self, max_key_count: usize) -> Result<RotationPlan, ContractViolation> {
        plan(&self.expired, &self.valid, self.current_id(), max_key_count)
    }
}

/// Compute the rotation plan
///
/// 1. Every expired key except the current one is deleted.
/// 2. When more than `max_key_count` keys are valid, the oldest valid
///    non-current keys are deleted until the ceiling holds. Equal ages keep
///    listing order.
/// 3. A replacement is created iff the current key is expired.
/// 4. An expired current key is deleted last, after the replacement is
///    persisted.
///
/// # Errors
///
/// A current key absent from both sequences is a [`ContractViolation`],
/// never a silent "must create".
pub fn plan(
    expired: &[ClassifiedKey],
    valid: &[ClassifiedKey],
    current_id: &AccessKeyId,
    max_key_count: usize,
) -> Result<RotationPlan, ContractViolation> {
    let current_expired = expired.iter().find(|key| key.id() == current_id);
    let current_valid = valid.iter().any(|key| key.id() == current_id);

    if current_expired.is_none() && !current_valid {
        if expired.is_empty() && valid.is_empty() {
            return Err(ContractViolation::EmptyKeySet);
        }
        return Err(ContractViolation::CurrentKeyMissing {
            current_id: current_id.clone(),
        });
    }

    let mut to_delete: Vec<ClassifiedKey> = expired
        .iter()
        .filter(|key| key.id() != current_id)
        .map(not_current)
        .collect();

    if valid.len() > max_key_count {
        let excess = valid.len() - max_key_count;
        let mut candidates: Vec<&ClassifiedKey> =
            valid.iter().filter(|key| key.id() != current_id).collect();
        // stable: equal ages keep listing order
        candidates.sort_by(|a, b| b.age_days.cmp(&a.age_days));
        to_delete.extend(candidates.into_iter().take(excess).map(not_current));
    }

    if let Some(current) = current_expired {
        let mut current = current.clone();
        current.is_current = true;
        to_delete.push(current);
    }

    Ok(RotationPlan {
        to_delete,
        create_replacement: current_expired.is_some(),
    })
}

fn not_current(key: &ClassifiedKey) -> ClassifiedKey {
    ClassifiedKey {
        is_current: false,
        ..key.clone()
    }
}
