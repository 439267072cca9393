//! In-memory key store
//!
//! Models one identity's key set without any network access. Used by tests
//! and by callers that want to rehearse a pass.
//!
//! Mirrors the IAM behaviours the engine depends on:
//! - listing order is insertion order
//! - deleting an unknown id fails with `NotFound`
//! - creating beyond the per-identity quota fails with `LimitExceeded`

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::{AccessKeyId, CredentialPair, KeyRecord, KeyStoreError, SecretString};
use crate::traits::KeyStore;

/// IAM allows two access keys per user
pub const DEFAULT_KEY_QUOTA: usize = 2;

/// One call recorded by [`MemoryKeyStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `list()`
    List,
    /// `delete(id)`, recorded even if it failed
    Delete(AccessKeyId),
    /// `create()`, with the minted id when it succeeded
    Create(Option<AccessKeyId>),
}

/// Key store holding keys in process memory
#[derive(Debug)]
pub struct MemoryKeyStore {
    owner: String,
    quota: usize,
    keys: Mutex<Vec<KeyRecord>>,
    in_use: Mutex<HashSet<AccessKeyId>>,
    journal: Mutex<Vec<StoreCall>>,
    fail_on_list: AtomicBool,
    fail_on_delete: AtomicBool,
    fail_on_create: AtomicBool,
}

impl MemoryKeyStore {
    /// Create an empty store for `owner`
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            quota: DEFAULT_KEY_QUOTA,
            keys: Mutex::new(Vec::new()),
            in_use: Mutex::new(HashSet::new()),
            journal: Mutex::new(Vec::new()),
            fail_on_list: AtomicBool::new(false),
            fail_on_delete: AtomicBool::new(false),
            fail_on_create: AtomicBool::new(false),
        }
    }

    /// Override the per-identity key quota
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Insert an existing key
    pub fn seed(&self, record: KeyRecord) {
        self.keys.lock().push(record);
    }

    /// Insert a key created `age_days` days ago and return its id
    pub fn seed_aged(&self, age_days: i64) -> AccessKeyId {
        let id = generate_key_id();
        let record = KeyRecord::new(id.clone(), Utc::now() - Duration::days(age_days))
            .with_user_name(self.owner.clone());
        self.seed(record);
        id
    }

    /// Insert a key created at `created_at` and return its id
    pub fn seed_at(&self, created_at: DateTime<Utc>) -> AccessKeyId {
        let id = generate_key_id();
        self.seed(KeyRecord::new(id.clone(), created_at).with_user_name(self.owner.clone()));
        id
    }

    /// Make `delete(id)` fail with `InUse`
    pub fn mark_in_use(&self, id: &AccessKeyId) {
        self.in_use.lock().insert(id.clone());
    }

    /// Make the next list fail
    pub fn fail_next_list(&self) {
        self.fail_on_list.store(true, Ordering::SeqCst);
    }

    /// Make the next delete fail
    pub fn fail_next_delete(&self) {
        self.fail_on_delete.store(true, Ordering::SeqCst);
    }

    /// Make the next create fail
    pub fn fail_next_create(&self) {
        self.fail_on_create.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the key set
    pub fn keys(&self) -> Vec<KeyRecord> {
        self.keys.lock().clone()
    }

    /// Ids currently in the key set
    pub fn key_ids(&self) -> Vec<AccessKeyId> {
        self.keys.lock().iter().map(|k| k.id.clone()).collect()
    }

    /// Whether `id` is in the key set
    pub fn contains(&self, id: &AccessKeyId) -> bool {
        self.keys.lock().iter().any(|k| &k.id == id)
    }

    /// Every call received, in order
    pub fn journal(&self) -> Vec<StoreCall> {
        self.journal.lock().clone()
    }

    fn record(&self, call: StoreCall) {
        self.journal.lock().push(call);
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn list(&self) -> Result<Vec<KeyRecord>, KeyStoreError> {
        self.record(StoreCall::List);

        if self.fail_on_list.swap(false, Ordering::SeqCst) {
            return Err(KeyStoreError::Request {
                operation: "list",
                message: "injected failure".to_string(),
            });
        }

        Ok(self.keys())
    }

    async fn delete(&self, id: &AccessKeyId) -> Result<(), KeyStoreError> {
        self.record(StoreCall::Delete(id.clone()));

        if self.fail_on_delete.swap(false, Ordering::SeqCst) {
            return Err(KeyStoreError::Request {
                operation: "delete",
                message: "injected failure".to_string(),
            });
        }

        if self.in_use.lock().contains(id) {
            return Err(KeyStoreError::InUse { id: id.to_string() });
        }

        let mut keys = self.keys.lock();
        let before = keys.len();
        keys.retain(|k| &k.id != id);
        if keys.len() == before {
            return Err(KeyStoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn create(&self) -> Result<CredentialPair, KeyStoreError> {
        if self.fail_on_create.swap(false, Ordering::SeqCst) {
            self.record(StoreCall::Create(None));
            return Err(KeyStoreError::Request {
                operation: "create",
                message: "injected failure".to_string(),
            });
        }

        let mut keys = self.keys.lock();
        if keys.len() >= self.quota {
            drop(keys);
            self.record(StoreCall::Create(None));
            return Err(KeyStoreError::LimitExceeded);
        }

        let id = generate_key_id();
        keys.push(KeyRecord::new(id.clone(), Utc::now()).with_user_name(self.owner.clone()));
        drop(keys);
        self.record(StoreCall::Create(Some(id.clone())));

        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Ok(CredentialPair::new(id, SecretString::new(secret), self.owner.clone()))
    }
}

fn generate_key_id() -> AccessKeyId {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    // AKIA + 16 characters, like IAM long-term keys; always valid
    AccessKeyId::from_trusted(format!("AKIA{}", &suffix[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryKeyStore::new("deploy-bot");
        let a = store.seed_aged(10);
        let b = store.seed_aged(1);

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|k| k.id).collect();

        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_quota_is_enforced() {
        let store = MemoryKeyStore::new("deploy-bot");
        store.seed_aged(1);
        store.seed_aged(2);

        let err = store.create().await.unwrap_err();

        assert!(matches!(err, KeyStoreError::LimitExceeded));
        assert_eq!(store.journal(), vec![StoreCall::Create(None)]);
    }

    #[tokio::test]
    async fn test_create_issues_pair_for_owner() {
        let store = MemoryKeyStore::new("deploy-bot");

        let pair = store.create().await.unwrap();

        assert_eq!(pair.owner_username, "deploy-bot");
        assert!(pair.id.as_str().starts_with("AKIA"));
        assert_eq!(pair.id.as_str().len(), 20);
        assert_eq!(pair.secret.len(), 64);
        assert!(store.contains(&pair.id));
    }

    #[tokio::test]
    async fn test_delete_errors() {
        let store = MemoryKeyStore::new("deploy-bot");
        let id = store.seed_aged(5);
        let ghost = AccessKeyId::new("AKIAGHOST").unwrap();

        assert!(matches!(
            store.delete(&ghost).await,
            Err(KeyStoreError::NotFound { .. })
        ));

        store.mark_in_use(&id);
        assert!(matches!(
            store.delete(&id).await,
            Err(KeyStoreError::InUse { .. })
        ));
        assert!(store.contains(&id));
    }

    #[tokio::test]
    async fn test_injected_failures_fire_once() {
        let store = MemoryKeyStore::new("deploy-bot");
        store.fail_next_list();

        assert!(store.list().await.is_err());
        assert!(store.list().await.is_ok());
        assert_eq!(store.journal(), vec![StoreCall::List, StoreCall::List]);
    }
}
