//! Pending-Call Store Port - persistence for calls awaiting confirmation.
//!
//! The store is a durable keyed-record cache with per-record expiry.
//! Expiry is enforced lazily: a read of an expired record deletes it and
//! reports absence. A periodic sweep may delete expired records in bulk,
//! but that is an optimization, not a correctness requirement.
//!
//! # Example
//!
//! ```ignore
//! use planwright::ports::PendingCallStore;
//!
//! struct PostgresPendingCallRepository { /* ... */ }
//!
//! #[async_trait]
//! impl PendingCallStore for PostgresPendingCallRepository {
//!     async fn put(&self, call: PendingToolCall) -> Result<(), PendingCallStoreError> {
//!         // Insert into pending_tool_calls table
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{PendingCallId, UserId};
use crate::domain::tools::PendingToolCall;

/// Port for pending tool call persistence.
///
/// Races between confirm and cancel for the same id are resolved by the
/// store's own atomic delete-and-check; there is no in-process locking.
#[async_trait]
pub trait PendingCallStore: Send + Sync {
    /// Durably stores a new pending call.
    ///
    /// A storage failure propagates; callers must never treat a failed
    /// write as a parked call.
    async fn put(&self, call: PendingToolCall) -> Result<(), PendingCallStoreError>;

    /// Returns the record, or `None` when absent or already expired.
    ///
    /// An expired record is deleted on read (lazy expiry).
    async fn get(&self, id: PendingCallId) -> Result<Option<PendingToolCall>, PendingCallStoreError>;

    /// Removes the record if present. Idempotent.
    ///
    /// Returns `true` when a record was actually removed, which is how
    /// racing confirm/cancel calls decide who won.
    async fn delete(&self, id: PendingCallId) -> Result<bool, PendingCallStoreError>;

    /// Returns all non-expired records owned by a user.
    ///
    /// Used for multi-session visibility, not for cleanup.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<PendingToolCall>, PendingCallStoreError>;

    /// Deletes all expired records in bulk.
    ///
    /// Called by an external scheduler; returns the number deleted.
    async fn sweep_expired(&self) -> Result<u64, PendingCallStoreError>;
}

/// Errors from the pending call store.
#[derive(Debug, Clone, Error)]
pub enum PendingCallStoreError {
    /// Database or storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PendingCallStoreError {
    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}
