//! Redis-backed sync broadcaster for production deployments.
//!
//! Publishes each sync action as JSON on a per-tenant channel
//! (`sync:{tenant_id}`). Every live client session of that tenant is
//! subscribed to the channel and invalidates the named caches on
//! receipt. Durable replay is handled separately by the sync log.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::TenantId;
use crate::domain::tools::SyncAction;
use crate::ports::{BroadcastError, SyncBroadcaster};

/// Redis-backed implementation of [`SyncBroadcaster`].
#[derive(Clone)]
pub struct RedisSyncBroadcaster {
    conn: MultiplexedConnection,
    channel_prefix: String,
}

impl RedisSyncBroadcaster {
    /// Creates a new broadcaster on the default `sync:` channel prefix.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            channel_prefix: "sync".to_string(),
        }
    }

    /// Overrides the channel prefix (e.g. for test isolation).
    pub fn with_channel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self
    }

    /// The channel a tenant's actions are published on.
    pub fn channel_for(&self, tenant_id: TenantId) -> String {
        sync_channel(&self.channel_prefix, tenant_id)
    }
}

/// Builds the per-tenant channel name.
pub fn sync_channel(prefix: &str, tenant_id: TenantId) -> String {
    format!("{}:{}", prefix, tenant_id)
}

#[async_trait]
impl SyncBroadcaster for RedisSyncBroadcaster {
    async fn publish(&self, action: &SyncAction) -> Result<(), BroadcastError> {
        let payload = serde_json::to_string(action)
            .map_err(|e| BroadcastError::serialization(e.to_string()))?;

        let channel = self.channel_for(action.tenant_id);
        let mut conn = self.conn.clone();
        let _receivers: i64 = conn
            .publish(channel, payload)
            .await
            .map_err(|e| BroadcastError::channel(e.to_string()))?;

        Ok(())
    }
}
