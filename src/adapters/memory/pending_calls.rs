//! In-memory pending call store.
//!
//! Used by tests and single-node development. Mirrors the lazy-expiry
//! contract of the Postgres adapter: an expired record is deleted on
//! read and reported as absent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{PendingCallId, Timestamp, UserId};
use crate::domain::tools::PendingToolCall;
use crate::ports::{PendingCallStore, PendingCallStoreError};

/// In-memory implementation of [`PendingCallStore`].
#[derive(Default)]
pub struct InMemoryPendingCallStore {
    calls: Mutex<HashMap<PendingCallId, PendingToolCall>>,
    fail_next_put: AtomicBool,
}

impl InMemoryPendingCallStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `put` fail with a storage error (test support).
    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::SeqCst);
    }

    /// Number of records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.calls.lock().expect("pending calls lock poisoned").len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PendingCallStore for InMemoryPendingCallStore {
    async fn put(&self, call: PendingToolCall) -> Result<(), PendingCallStoreError> {
        if self.fail_next_put.swap(false, Ordering::SeqCst) {
            return Err(PendingCallStoreError::storage("write failed (injected)"));
        }
        self.calls
            .lock()
            .expect("pending calls lock poisoned")
            .insert(call.id(), call);
        Ok(())
    }

    async fn get(
        &self,
        id: PendingCallId,
    ) -> Result<Option<PendingToolCall>, PendingCallStoreError> {
        let mut calls = self.calls.lock().expect("pending calls lock poisoned");
        match calls.get(&id) {
            Some(call) if call.is_expired() => {
                calls.remove(&id);
                Ok(None)
            }
            Some(call) => Ok(Some(call.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: PendingCallId) -> Result<bool, PendingCallStoreError> {
        Ok(self
            .calls
            .lock()
            .expect("pending calls lock poisoned")
            .remove(&id)
            .is_some())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PendingToolCall>, PendingCallStoreError> {
        let now = Timestamp::now();
        Ok(self
            .calls
            .lock()
            .expect("pending calls lock poisoned")
            .values()
            .filter(|c| c.user_id() == user_id && !c.is_expired_at(now))
            .cloned()
            .collect())
    }

    async fn sweep_expired(&self) -> Result<u64, PendingCallStoreError> {
        let now = Timestamp::now();
        let mut calls = self.calls.lock().expect("pending calls lock poisoned");
        let before = calls.len();
        calls.retain(|_, c| !c.is_expired_at(now));
        Ok((before - calls.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TenantId;
    use crate::domain::tools::{registry, ToolName, ToolPreview};
    use serde_json::json;

    fn sample_call(user: &str) -> PendingToolCall {
        let meta = registry().metadata(ToolName::AddGuest);
        PendingToolCall::new(
            UserId::new(user),
            TenantId::new(),
            ToolName::AddGuest,
            json!({"clientId": "c1", "firstName": "Ana"}),
            ToolPreview {
                tool_name: ToolName::AddGuest,
                action_label: meta.action_label.to_string(),
                description: "Add guest Ana to the guest list".into(),
                fields: vec![],
                cascade_effects: vec![],
                warnings: vec![],
                requires_confirmation: true,
            },
        )
    }

    #[tokio::test]
    async fn put_then_get_returns_call() {
        let store = InMemoryPendingCallStore::new();
        let call = sample_call("u-1");
        let id = call.id();

        store.put(call).await.unwrap();
        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.id(), id);
    }

    #[tokio::test]
    async fn get_of_expired_call_deletes_it() {
        let store = InMemoryPendingCallStore::new();
        let call = sample_call("u-1").with_expires_at(Timestamp::now().plus_millis(-1));
        let id = call.id();
        store.put(call).await.unwrap();

        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryPendingCallStore::new();
        let call = sample_call("u-1");
        let id = call.id();
        store.put(call).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn list_for_user_filters_owner_and_expiry() {
        let store = InMemoryPendingCallStore::new();
        store.put(sample_call("u-1")).await.unwrap();
        store.put(sample_call("u-2")).await.unwrap();
        store
            .put(sample_call("u-1").with_expires_at(Timestamp::now().plus_millis(-1)))
            .await
            .unwrap();

        let calls = store.list_for_user(&UserId::new("u-1")).await.unwrap();
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired() {
        let store = InMemoryPendingCallStore::new();
        store.put(sample_call("u-1")).await.unwrap();
        store
            .put(sample_call("u-1").with_expires_at(Timestamp::now().plus_millis(-1)))
            .await
            .unwrap();

        let swept = store.sweep_expired().await.unwrap();
        assert_eq!(swept, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn injected_put_failure_propagates() {
        let store = InMemoryPendingCallStore::new();
        store.fail_next_put();

        let result = store.put(sample_call("u-1")).await;
        assert!(matches!(result, Err(PendingCallStoreError::Storage(_))));
        assert!(store.is_empty());
    }
}
