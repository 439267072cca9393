//! In-memory sink

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{CredentialPair, SinkError};
use crate::traits::CredentialSink;

/// Sink keeping every pair it receives
#[derive(Debug)]
pub struct MemorySink {
    name: &'static str,
    pairs: Mutex<Vec<CredentialPair>>,
    fail_on_write: AtomicBool,
}

impl MemorySink {
    /// Create a sink named `memory`
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create a sink reporting `name`
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            pairs: Mutex::new(Vec::new()),
            fail_on_write: AtomicBool::new(false),
        }
    }

    /// Make the next write fail
    pub fn fail_next_write(&self) {
        self.fail_on_write.store(true, Ordering::SeqCst);
    }

    /// Pairs written so far
    pub fn pairs(&self) -> Vec<CredentialPair> {
        self.pairs.lock().clone()
    }

    /// Most recent pair
    pub fn last(&self) -> Option<CredentialPair> {
        self.pairs.lock().last().cloned()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSink for MemorySink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write(&self, pair: &CredentialPair) -> Result<(), SinkError> {
        if self.fail_on_write.swap(false, Ordering::SeqCst) {
            return Err(SinkError::Io {
                path: format!("memory://{}", self.name).into(),
                source: std::io::Error::other("injected failure"),
            });
        }

        self.pairs.lock().push(pair.clone());
        Ok(())
    }
}
