//! Sync Broadcaster Port - publishing cache invalidations to live clients.
//!
//! Implementations deliver a [`SyncAction`] to every other connected
//! session of the same tenant. Delivery is best-effort: the dispatcher
//! logs and swallows publish failures because the mutation has already
//! committed by the time broadcasting happens.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::tools::SyncAction;

/// Port for publishing sync actions on the broadcast channel.
#[async_trait]
pub trait SyncBroadcaster: Send + Sync {
    /// Publishes one action to the tenant's channel.
    async fn publish(&self, action: &SyncAction) -> Result<(), BroadcastError>;
}

/// Errors from the broadcast channel.
#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    /// The channel or its transport failed
    #[error("Broadcast channel error: {0}")]
    Channel(String),

    /// The action could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BroadcastError {
    /// Creates a channel error.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_error_displays_message() {
        let err = BroadcastError::channel("connection reset");
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn sync_broadcaster_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SyncBroadcaster>();
    }
}
