//! In-memory sync bus for testing.
//!
//! Provides synchronous, deterministic delivery and capture of sync
//! actions for unit tests. Implements both the broadcast channel and
//! the durable log so a test can assert on either side.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in
//! production. Production code uses the Redis broadcaster and the
//! Postgres sync log.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{TenantId, Timestamp};
use crate::domain::tools::SyncAction;
use crate::ports::{BroadcastError, SyncBroadcaster, SyncLog, SyncLogError};

/// In-memory sync bus for testing.
///
/// Features:
/// - Synchronous delivery (deterministic for tests)
/// - Action capture for assertions
/// - Failure injection for the best-effort broadcast path
#[derive(Default)]
pub struct InMemorySyncBus {
    published: RwLock<Vec<SyncAction>>,
    log: RwLock<Vec<SyncAction>>,
    fail_publish: AtomicBool,
    fail_append: AtomicBool,
}

impl InMemorySyncBus {
    /// Creates a new empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all published actions (for test assertions).
    pub fn published_actions(&self) -> Vec<SyncAction> {
        self.published
            .read()
            .expect("InMemorySyncBus: published lock poisoned")
            .clone()
    }

    /// Returns all logged actions (for test assertions).
    pub fn logged_actions(&self) -> Vec<SyncAction> {
        self.log
            .read()
            .expect("InMemorySyncBus: log lock poisoned")
            .clone()
    }

    /// Returns count of published actions.
    pub fn published_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemorySyncBus: published lock poisoned")
            .len()
    }

    /// Makes every subsequent publish fail (test support).
    pub fn fail_publishes(&self) {
        self.fail_publish.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent append fail (test support).
    pub fn fail_appends(&self) {
        self.fail_append.store(true, Ordering::SeqCst);
    }

    /// Clears captured actions (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemorySyncBus: published write lock poisoned")
            .clear();
        self.log
            .write()
            .expect("InMemorySyncBus: log write lock poisoned")
            .clear();
    }
}

#[async_trait]
impl SyncBroadcaster for InMemorySyncBus {
    async fn publish(&self, action: &SyncAction) -> Result<(), BroadcastError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(BroadcastError::channel("publish failed (injected)"));
        }
        self.published
            .write()
            .expect("InMemorySyncBus: published write lock poisoned")
            .push(action.clone());
        Ok(())
    }
}

#[async_trait]
impl SyncLog for InMemorySyncBus {
    async fn append(&self, action: &SyncAction) -> Result<(), SyncLogError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(SyncLogError::storage("append failed (injected)"));
        }
        self.log
            .write()
            .expect("InMemorySyncBus: log write lock poisoned")
            .push(action.clone());
        Ok(())
    }

    async fn replay_since(
        &self,
        tenant_id: TenantId,
        since: Timestamp,
    ) -> Result<Vec<SyncAction>, SyncLogError> {
        let mut actions: Vec<SyncAction> = self
            .log
            .read()
            .expect("InMemorySyncBus: log lock poisoned")
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.timestamp.is_after(&since))
            .cloned()
            .collect();
        actions.sort_by_key(|a| a.timestamp);
        Ok(actions)
    }
}
