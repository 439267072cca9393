//! Rotation plan execution
//!
//! Applies a [`RotationPlan`] to a [`KeyStore`] and fans the replacement out
//! to every [`CredentialSink`]. The ordering is fixed:
//!
//! ```text
//! delete non-current ─→ create ─→ write sink 1..n ─→ delete current
//!      (RoomMade)      (Created)     (Persisted)       (Finalized)
//! ```
//!
//! The first failure aborts the pass. Nothing is retried and nothing is
//! rolled back: a deleted key stays deleted.

use std::sync::Arc;

use serde::Serialize;

use super::error::{RotationError, RotationResult};
use super::planner::RotationPlan;
use super::state::RotationStage;
use crate::core::{AccessKeyId, CredentialPair};
use crate::traits::{CredentialSink, KeyStore};

/// What a completed pass did
///
/// Holds ids only, never secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationReport {
    /// Keys deleted, in deletion order
    pub deleted: Vec<AccessKeyId>,

    /// Replacement key id, if one was created
    pub created: Option<AccessKeyId>,

    /// Sinks the replacement was written to, in order
    pub persisted_to: Vec<&'static str>,

    /// Last stage reached
    pub stage: RotationStage,
}

impl RotationReport {
    fn new() -> Self {
        Self {
            deleted: Vec::new(),
            created: None,
            persisted_to: Vec::new(),
            stage: RotationStage::Planned,
        }
    }

    /// Whether the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.created.is_none()
    }

    fn advance(&mut self, to: RotationStage) -> RotationResult<()> {
        self.stage = self.stage.transition_to(to)?;
        tracing::debug!(stage = %self.stage, "rotation stage reached");
        Ok(())
    }
}

/// Drives a plan against the key store and sinks
#[derive(Clone)]
pub struct RotationExecutor {
    store: Arc<dyn KeyStore>,
    sinks: Vec<Arc<dyn CredentialSink>>,
}

impl std::fmt::Debug for RotationExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sinks: Vec<&'static str> = self.sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("RotationExecutor")
            .field("sinks", &sinks)
            .finish_non_exhaustive()
    }
}

impl RotationExecutor {
    /// Create an executor over a store and an ordered list of sinks
    pub fn new(store: Arc<dyn KeyStore>, sinks: Vec<Arc<dyn CredentialSink>>) -> Self {
        Self { store, sinks }
    }

    /// Names of the configured sinks, in write order
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Execute the plan
    ///
    /// # Errors
    ///
    /// * `NoSinks` if a replacement is needed but no sink could receive it
    ///   (checked before anything is deleted)
    /// * `Delete` / `Create` / `Persist` from the failing collaborator, with
    ///   the stage it happened in
    pub async fn execute(&self, plan: RotationPlan) -> RotationResult<RotationReport> {
        if plan.create_replacement() && self.sinks.is_empty() {
            return Err(RotationError::NoSinks);
        }

        let (room, deferred, create_replacement) = plan.into_parts();
        let mut report = RotationReport::new();

        for key in &room {
            self.delete(key.id(), RotationStage::RoomMade).await?;
            report.deleted.push(key.id().clone());
        }
        report.advance(RotationStage::RoomMade)?;

        if create_replacement {
            let pair = self.store.create().await.map_err(RotationError::Create)?;
            tracing::info!(key_id = %pair.id, user = %pair.owner_username, "created new access key");
            report.created = Some(pair.id.clone());
            report.advance(RotationStage::Created)?;

            report.persisted_to = self.persist(&pair).await?;
            report.advance(RotationStage::Persisted)?;
        }

        if let Some(current) = deferred {
            self.delete(current.id(), RotationStage::Finalized).await?;
            report.deleted.push(current.id().clone());
        }
        report.advance(RotationStage::Finalized)?;

        Ok(report)
    }

    async fn delete(&self, id: &AccessKeyId, stage: RotationStage) -> RotationResult<()> {
        self.store
            .delete(id)
            .await
            .map_err(|source| RotationError::Delete {
                key_id: id.clone(),
                stage,
                source,
            })?;
        tracing::info!(key_id = %id, %stage, "removed access key");
        Ok(())
    }

    async fn persist(&self, pair: &CredentialPair) -> RotationResult<Vec<&'static str>> {
        let mut written = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            sink.write(pair)
                .await
                .map_err(|source| RotationError::Persist {
                    sink: sink.name(),
                    key_id: pair.id.clone(),
                    source,
                })?;
            tracing::info!(sink = sink.name(), key_id = %pair.id, "persisted new access key");
            written.push(sink.name());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{KeyRecord, KeyStoreError, SecretString, SinkError};
    use crate::rotation::{RotationPolicy, classify};
    use crate::traits::{MockCredentialSink, MockKeyStore};
    use chrono::{Duration, Utc};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> AccessKeyId {
        AccessKeyId::new(s).unwrap()
    }

    fn plan_for(keys: &[(&str, i64)], current: &str, max_keys: usize) -> RotationPlan {
        let now = Utc::now();
        let records: Vec<KeyRecord> = keys
            .iter()
            .map(|(k, days)| KeyRecord::new(id(k), now - Duration::days(*days)))
            .collect();
        let policy = RotationPolicy::new(30, max_keys).unwrap();
        classify(&records, &policy, &id(current), now)
            .plan(max_keys)
            .unwrap()
    }

    fn new_pair() -> CredentialPair {
        CredentialPair::new(id("AKIANEW"), SecretString::new("s3cr3t"), "deploy-bot")
    }

    fn sink(name: &'static str, seq: &mut Sequence, result: Result<(), SinkError>) -> MockCredentialSink {
        let mut sink = MockCredentialSink::new();
        sink.expect_name().return_const(name);
        let mut result = Some(result);
        sink.expect_write()
            .times(1)
            .in_sequence(seq)
            .returning(move |_| result.take().unwrap_or(Ok(())));
        sink
    }

    #[tokio::test]
    async fn test_full_rotation_order() {
        let plan = plan_for(&[("AKIAOLD", 90), ("AKIACUR", 45)], "AKIACUR", 1);
        let mut seq = Sequence::new();

        let mut store = MockKeyStore::new();
        store
            .expect_delete()
            .withf(|k| k.as_str() == "AKIAOLD")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(new_pair()));
        let file = sink("file", &mut seq, Ok(()));
        let profile = sink("profile", &mut seq, Ok(()));
        store
            .expect_delete()
            .withf(|k| k.as_str() == "AKIACUR")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let executor = RotationExecutor::new(
            Arc::new(store),
            vec![Arc::new(file), Arc::new(profile)],
        );
        let report = executor.execute(plan).await.unwrap();

        assert_eq!(report.deleted, vec![id("AKIAOLD"), id("AKIACUR")]);
        assert_eq!(report.created, Some(id("AKIANEW")));
        assert_eq!(report.persisted_to, vec!["file", "profile"]);
        assert_eq!(report.stage, RotationStage::Finalized);
    }

    #[tokio::test]
    async fn test_noop_plan_touches_nothing() {
        let plan = plan_for(&[("AKIACUR", 3)], "AKIACUR", 1);
        let store = MockKeyStore::new();

        let executor = RotationExecutor::new(Arc::new(store), Vec::new());
        let report = executor.execute(plan).await.unwrap();

        assert!(report.is_noop());
        assert_eq!(report.stage, RotationStage::Finalized);
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_current_key() {
        let plan = plan_for(&[("AKIACUR", 45)], "AKIACUR", 1);
        let mut seq = Sequence::new();

        let mut store = MockKeyStore::new();
        store
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(new_pair()));
        store.expect_delete().never();

        let file = sink(
            "file",
            &mut seq,
            Err(SinkError::Io {
                path: "/ro/key.json".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
        );
        let mut later = MockCredentialSink::new();
        later.expect_name().return_const("circleci");
        later.expect_write().never();

        let executor =
            RotationExecutor::new(Arc::new(store), vec![Arc::new(file), Arc::new(later)]);
        let err = executor.execute(plan).await.unwrap_err();

        assert!(matches!(err, RotationError::Persist { sink: "file", .. }));
        assert_eq!(err.stage(), Some(RotationStage::Persisted));
    }

    #[tokio::test]
    async fn test_delete_failure_aborts_before_create() {
        let plan = plan_for(&[("AKIAOLD", 90), ("AKIACUR", 45)], "AKIACUR", 1);

        let mut store = MockKeyStore::new();
        store.expect_delete().times(1).returning(|k| {
            Err(KeyStoreError::NotFound {
                id: k.to_string(),
            })
        });
        store.expect_create().never();
        let mut file = MockCredentialSink::new();
        file.expect_name().return_const("file");
        file.expect_write().never();

        let executor = RotationExecutor::new(Arc::new(store), vec![Arc::new(file)]);
        let err = executor.execute(plan).await.unwrap_err();

        match err {
            RotationError::Delete { key_id, stage, .. } => {
                assert_eq!(key_id, id("AKIAOLD"));
                assert_eq!(stage, RotationStage::RoomMade);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced() {
        let plan = plan_for(&[("AKIACUR", 45)], "AKIACUR", 1);

        let mut store = MockKeyStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|| Err(KeyStoreError::LimitExceeded));
        store.expect_delete().never();
        let mut file = MockCredentialSink::new();
        file.expect_name().return_const("file");
        file.expect_write().never();

        let executor = RotationExecutor::new(Arc::new(store), vec![Arc::new(file)]);
        let err = executor.execute(plan).await.unwrap_err();

        assert!(matches!(
            err,
            RotationError::Create(KeyStoreError::LimitExceeded)
        ));
    }

    #[tokio::test]
    async fn test_replacement_without_sinks_is_refused_up_front() {
        let plan = plan_for(&[("AKIAOLD", 90), ("AKIACUR", 45)], "AKIACUR", 1);

        let mut store = MockKeyStore::new();
        store.expect_delete().never();
        store.expect_create().never();

        let executor = RotationExecutor::new(Arc::new(store), Vec::new());
        let err = executor.execute(plan).await.unwrap_err();

        assert!(matches!(err, RotationError::NoSinks));
    }
}
