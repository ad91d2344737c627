//! Change broadcasting after committed mutations.
//!
//! Once a mutation has committed, a sync action describing the stale
//! cached queries is published to live clients and appended to the
//! durable replay log. Both operations run concurrently and are
//! best-effort: the mutation has already committed, so a broadcast
//! failure is logged and swallowed, never surfaced to the caller.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{CallerContext, RequestIdentity, ToolError};
use crate::domain::tools::{SyncAction, ToolCall, ToolExecutionResult};
use crate::ports::{SyncBroadcaster, SyncLog};

use super::execute::ToolDispatcher;
use super::query_paths::sync_entry;

/// Builds and delivers sync actions.
pub struct SyncService {
    broadcaster: Arc<dyn SyncBroadcaster>,
    log: Arc<dyn SyncLog>,
}

impl SyncService {
    /// Creates a new sync service.
    pub fn new(broadcaster: Arc<dyn SyncBroadcaster>, log: Arc<dyn SyncLog>) -> Self {
        Self { broadcaster, log }
    }

    /// Builds the sync action for a successful execution, or `None`
    /// when the tool invalidates nothing.
    pub fn action_for(result: &ToolExecutionResult, ctx: &CallerContext) -> Option<SyncAction> {
        let entry = sync_entry(result.tool_name())?;

        let data = result.data().cloned().unwrap_or(serde_json::Value::Null);
        let entity_id = data
            .get("entityId")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let scope_id = data
            .get("clientId")
            .and_then(|v| v.as_str())
            .map(String::from);

        Some(SyncAction::new(
            entry.action_type,
            entry.module,
            entity_id,
            data,
            ctx.tenant_id,
            scope_id,
            ctx.user_id.clone(),
            entry.query_paths.iter().map(|p| p.to_string()).collect(),
            result.tool_name(),
        ))
    }

    /// Publishes and persists one action, concurrently. Failures on
    /// either side are logged and swallowed.
    pub async fn broadcast(&self, action: &SyncAction) {
        let (published, appended) =
            tokio::join!(self.broadcaster.publish(action), self.log.append(action));

        if let Err(e) = published {
            warn!(action_id = %action.id, error = %e, "sync publish failed");
        }
        if let Err(e) = appended {
            warn!(action_id = %action.id, error = %e, "sync log append failed");
        }
    }

    /// Fires the broadcast as a background task; the caller is never
    /// blocked or failed by it.
    pub fn spawn_broadcast(self: &Arc<Self>, action: SyncAction) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.broadcast(&action).await;
        });
    }
}

/// Dispatch plus change broadcasting: the entry point mutating callers
/// use.
pub struct ExecutionPipeline {
    dispatcher: Arc<ToolDispatcher>,
    sync: Arc<SyncService>,
}

impl ExecutionPipeline {
    /// Creates a new pipeline.
    pub fn new(dispatcher: Arc<ToolDispatcher>, sync: Arc<SyncService>) -> Self {
        Self { dispatcher, sync }
    }

    /// The underlying dispatcher.
    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Executes a call and, on success of a non-query tool, fires
    /// exactly one best-effort broadcast attempt.
    pub async fn execute_with_sync(
        &self,
        call: &ToolCall,
        identity: &RequestIdentity,
    ) -> Result<ToolExecutionResult, ToolError> {
        let ctx = identity.require()?;
        let result = self.dispatcher.execute(call, identity).await?;

        if result.is_success() && !result.tool_name().is_query() {
            if let Some(action) = SyncService::action_for(&result, &ctx) {
                self.sync.spawn_broadcast(action);
            }
        }

        Ok(result)
    }
}
