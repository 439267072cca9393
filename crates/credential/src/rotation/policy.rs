//! Rotation Policy
//!
//! Age and count limits for one rotation pass.

use serde::{Deserialize, Serialize};

use super::error::{RotationError, RotationResult};

/// Default maximum key age in days
pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;

/// Default maximum number of keys the identity may hold
pub const DEFAULT_MAX_KEY_COUNT: usize = 1;

/// Immutable limits applied during a pass
///
/// - A key older than `max_age_days` whole days is expired.
/// - At most `max_key_count` valid keys survive a pass.
///
/// # Examples
///
/// ```
/// use keyturn_credential::rotation::RotationPolicy;
///
/// let policy = RotationPolicy::new(90, 2).unwrap();
/// assert_eq!(policy.max_age_days(), 90);
/// assert_eq!(policy.max_key_count(), 2);
///
/// // At least one key must be allowed
/// assert!(RotationPolicy::new(30, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy")]
pub struct RotationPolicy {
    max_age_days: u32,
    max_key_count: usize,
}

#[derive(Deserialize)]
struct RawPolicy {
    #[serde(default = "default_max_age_days")]
    max_age_days: u32,
    #[serde(default = "default_max_key_count")]
    max_key_count: usize,
}

fn default_max_age_days() -> u32 {
    DEFAULT_MAX_AGE_DAYS
}

fn default_max_key_count() -> usize {
    DEFAULT_MAX_KEY_COUNT
}

impl TryFrom<RawPolicy> for RotationPolicy {
    type Error = RotationError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        Self::new(raw.max_age_days, raw.max_key_count)
    }
}

impl RotationPolicy {
    /// Create a validated policy
    ///
    /// # Errors
    ///
    /// * `InvalidPolicy` if `max_key_count` is zero
    pub fn new(max_age_days: u32, max_key_count: usize) -> RotationResult<Self> {
        let policy = Self {
            max_age_days,
            max_key_count,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Validate the policy
    pub fn validate(&self) -> RotationResult<()> {
        if self.max_key_count == 0 {
            return Err(RotationError::InvalidPolicy {
                reason: "max key count must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Keys strictly older than this many whole days are expired
    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    /// Ceiling on valid keys left after a pass
    pub fn max_key_count(&self) -> usize {
        self.max_key_count
    }

    /// Whether a key of the given age is expired under this policy
    pub fn is_expired(&self, age_days: u32) -> bool {
        age_days > self.max_age_days
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            max_key_count: DEFAULT_MAX_KEY_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_validation() {
        assert!(RotationPolicy::new(0, 1).is_ok());

        let invalid = RotationPolicy::new(30, 0);
        assert!(
            invalid
                .unwrap_err()
                .to_string()
                .contains("at least 1")
        );
    }

    #[test]
    fn test_defaults() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_age_days(), 30);
        assert_eq!(policy.max_key_count(), 1);
    }

    #[test]
    fn test_expiry_boundary() {
        let policy = RotationPolicy::new(30, 1).unwrap();
        assert!(!policy.is_expired(29));
        assert!(!policy.is_expired(30));
        assert!(policy.is_expired(31));
    }

    #[test]
    fn test_deserialize_validates() {
        let policy: RotationPolicy = serde_json::from_str(r#"{"max_age_days": 7}"#).unwrap();
        assert_eq!(policy.max_age_days(), 7);
        assert_eq!(policy.max_key_count(), 1);

        assert!(serde_json::from_str::<RotationPolicy>(r#"{"max_key_count": 0}"#).is_err());
    }
}
