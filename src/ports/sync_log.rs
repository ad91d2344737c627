//! Sync Log Port - durable append-only log of sync actions.
//!
//! Clients that were disconnected replay the actions they missed from
//! this log. Appends are best-effort from the dispatcher's point of
//! view, but the log itself must be durable once an append succeeds.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{TenantId, Timestamp};
use crate::domain::tools::SyncAction;

/// Port for the durable sync action log.
#[async_trait]
pub trait SyncLog: Send + Sync {
    /// Appends one action to the log.
    async fn append(&self, action: &SyncAction) -> Result<(), SyncLogError>;

    /// Returns all actions for a tenant recorded after `since`, in
    /// timestamp order.
    async fn replay_since(
        &self,
        tenant_id: TenantId,
        since: Timestamp,
    ) -> Result<Vec<SyncAction>, SyncLogError>;
}

/// Errors from the sync log.
#[derive(Debug, Clone, Error)]
pub enum SyncLogError {
    /// Database or storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SyncLogError {
    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sync_log_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SyncLog>();
    }
}
