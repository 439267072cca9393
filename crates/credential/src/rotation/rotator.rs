//! Rotation pass driver
//!
//! Wires the pure stages (classify, plan) to the effectful executor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::classifier::{Classification, classify};
use super::error::{RotationError, RotationResult};
use super::executor::{RotationExecutor, RotationReport};
use super::policy::RotationPolicy;
use crate::core::AccessKeyId;
use crate::traits::{CredentialSink, KeyStore};

/// Runs rotation passes for one identity
///
/// Passes are serialized: a second `run` waits until the first one finishes.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use keyturn_credential::prelude::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryKeyStore::new("deploy-bot"));
/// let current = store.seed_aged(40);
///
/// let rotator = Rotator::builder()
///     .store(store.clone())
///     .sink(Arc::new(MemorySink::new()))
///     .policy(RotationPolicy::new(30, 1)?)
///     .build();
///
/// let report = rotator.run(&current).await?;
/// assert_eq!(report.deleted, vec![current]);
/// # Ok(())
/// # }
/// ```
pub struct Rotator {
    store: Arc<dyn KeyStore>,
    executor: RotationExecutor,
    policy: RotationPolicy,
    pass: Mutex<()>,
}

impl std::fmt::Debug for Rotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rotator")
            .field("policy", &self.policy)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl Rotator {
    /// Start building a rotator
    pub fn builder() -> RotatorBuilder<No> {
        RotatorBuilder::new()
    }

    /// Policy applied on every pass
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Run one pass against the current time
    pub async fn run(&self, current_id: &AccessKeyId) -> RotationResult<RotationReport> {
        self.run_at(current_id, Utc::now()).await
    }

    /// Run one pass with an explicit clock reading
    ///
    /// # Errors
    ///
    /// * `List` if the key set cannot be fetched
    /// * `ContractViolation` if the listing is empty or lacks `current_id`
    /// * any executor error, with the stage that failed
    #[tracing::instrument(skip(self, current_id, now), fields(current = %current_id))]
    pub async fn run_at(
        &self,
        current_id: &AccessKeyId,
        now: DateTime<Utc>,
    ) -> RotationResult<RotationReport> {
        let _pass = self.pass.lock().await;

        let keys = self.store.list().await.map_err(RotationError::List)?;

        let classification = classify(&keys, &self.policy, current_id, now);
        log_classification(&classification, &self.policy);
        let current = classification.current()?;
        tracing::debug!(age_days = current.age_days, "current key located");

        let plan = classification.plan(self.policy.max_key_count())?;

        tracing::info!(
            keys = classification.len(),
            valid = classification.valid.len(),
            to_remove = plan.to_delete().len(),
            create = plan.create_replacement(),
            "key summary"
        );

        if plan.is_noop() {
            tracing::info!("nothing to rotate");
        }

        self.executor.execute(plan).await
    }
}

fn log_classification(classification: &Classification, policy: &RotationPolicy) {
    for key in classification.iter() {
        let verdict = if policy.is_expired(key.age_days) {
            "expired"
        } else {
            "valid"
        };
        tracing::info!(
            key_id = %key.id(),
            status = %key.record.status,
            user = key.record.user_name.as_deref().unwrap_or("-"),
            age_days = key.age_days,
            current = key.is_current,
            verdict,
            "classified access key"
        );
    }
}

/// Marker for a builder without a key store
#[doc(hidden)]
#[derive(Debug, Clone, Copy, Default)]
pub struct No;

/// Builder for [`Rotator`]
///
/// The key store is required; `build` only exists once it is set.
pub struct RotatorBuilder<Store> {
    store: Store,
    sinks: Vec<Arc<dyn CredentialSink>>,
    policy: RotationPolicy,
}

impl RotatorBuilder<No> {
    /// Create a builder with the default policy and no sinks
    pub fn new() -> Self {
        Self {
            store: No,
            sinks: Vec::new(),
            policy: RotationPolicy::default(),
        }
    }

    /// Set the key store (required)
    pub fn store(self, store: Arc<dyn KeyStore>) -> RotatorBuilder<Arc<dyn KeyStore>> {
        RotatorBuilder {
            store,
            sinks: self.sinks,
            policy: self.policy,
        }
    }
}

impl<S> RotatorBuilder<S> {
    /// Append a sink; sinks are written in the order they are added
    pub fn sink(mut self, sink: Arc<dyn CredentialSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Append several sinks
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn CredentialSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Set the rotation policy
    pub fn policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl RotatorBuilder<Arc<dyn KeyStore>> {
    /// Build the rotator
    pub fn build(self) -> Rotator {
        Rotator {
            executor: RotationExecutor::new(Arc::clone(&self.store), self.sinks),
            store: self.store,
            policy: self.policy,
            pass: Mutex::new(()),
        }
    }
}

impl Default for RotatorBuilder<No> {
    fn default() -> Self {
        Self::new()
    }
}
