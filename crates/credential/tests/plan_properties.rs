//! Property tests for classification and planning

use chrono::{DateTime, Duration, TimeZone, Utc};
use keyturn_credential::rotation::{RotationPolicy, classify};
use keyturn_credential::{AccessKeyId, KeyRecord};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// Key ages in hours plus the index of the current key
fn key_set() -> impl Strategy<Value = (Vec<i64>, usize)> {
    prop::collection::vec(0i64..24 * 120, 1..8).prop_flat_map(|ages| {
        let len = ages.len();
        (Just(ages), 0..len)
    })
}

fn records(ages_hours: &[i64]) -> Vec<KeyRecord> {
    ages_hours
        .iter()
        .enumerate()
        .map(|(i, hours)| {
            KeyRecord::new(
                AccessKeyId::new(format!("AKIAKEY{i}")).unwrap(),
                now() - Duration::hours(*hours),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn partition_is_exhaustive(
        (ages, current) in key_set(),
        max_age in 0u32..90,
        max_keys in 1usize..4,
    ) {
        let keys = records(&ages);
        let policy = RotationPolicy::new(max_age, max_keys).unwrap();

        let classification = classify(&keys, &policy, &keys[current].id, now());

        prop_assert_eq!(classification.expired.len() + classification.valid.len(), keys.len());
        prop_assert!(classification.expired.iter().all(|k| k.age_days > max_age));
        prop_assert!(classification.valid.iter().all(|k| k.age_days <= max_age));
    }

    #[test]
    fn current_is_deleted_last_and_only_when_expired(
        (ages, current) in key_set(),
        max_age in 0u32..90,
        max_keys in 1usize..4,
    ) {
        let keys = records(&ages);
        let current_id = keys[current].id.clone();
        let policy = RotationPolicy::new(max_age, max_keys).unwrap();
        let classification = classify(&keys, &policy, &current_id, now());
        let current_age = classification.current().unwrap().age_days;

        let plan = classification.plan(max_keys).unwrap();

        let positions: Vec<usize> = plan
            .to_delete()
            .iter()
            .enumerate()
            .filter(|(_, k)| k.id() == &current_id)
            .map(|(i, _)| i)
            .collect();
        prop_assert!(positions.len() <= 1);
        if let Some(pos) = positions.first() {
            prop_assert_eq!(*pos, plan.to_delete().len() - 1);
        }

        prop_assert_eq!(plan.create_replacement(), current_age > max_age);
        prop_assert_eq!(positions.len() == 1, plan.create_replacement());
    }

    #[test]
    fn no_valid_key_deleted_within_ceiling(
        (ages, current) in key_set(),
        max_age in 0u32..90,
        max_keys in 1usize..4,
    ) {
        let keys = records(&ages);
        let policy = RotationPolicy::new(max_age, max_keys).unwrap();
        let classification = classify(&keys, &policy, &keys[current].id, now());

        let plan = classification.plan(max_keys).unwrap();

        if classification.valid.len() <= max_keys {
            prop_assert!(plan.to_delete().iter().all(|k| k.age_days > max_age));
        } else {
            let deleted_valid = plan.to_delete().iter().filter(|k| k.age_days <= max_age).count();
            prop_assert_eq!(deleted_valid, classification.valid.len() - max_keys);
        }
    }

    #[test]
    fn planning_is_idempotent(
        (ages, current) in key_set(),
        max_age in 0u32..90,
        max_keys in 1usize..4,
    ) {
        let keys = records(&ages);
        let policy = RotationPolicy::new(max_age, max_keys).unwrap();
        let classification = classify(&keys, &policy, &keys[current].id, now());

        prop_assert_eq!(
            classification.plan(max_keys).unwrap(),
            classification.plan(max_keys).unwrap()
        );
    }
}
