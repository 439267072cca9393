//! Key age arithmetic

use chrono::{DateTime, Utc};

/// Whole days elapsed between `created_at` and `now`
///
/// Truncates rather than rounds: a key created 23h59m ago is 0 days old.
/// A creation date in the future (clock skew) counts as 0 days.
#[must_use]
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let hours = (now - created_at).num_hours();
    if hours <= 0 {
        return 0;
    }
    u32::try_from(hours / 24).unwrap_or(u32::MAX)
}
