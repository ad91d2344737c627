//! Proposal and confirmation of mutating tool calls.
//!
//! A proposed mutation is previewed and parked in the pending-call
//! store until the user confirms or cancels it, or it expires. Racing
//! confirm/cancel calls for the same id are resolved by the store's
//! atomic delete-and-check: exactly one caller claims the record, the
//! other sees not-found. A confirm whose execution fails re-parks the
//! record so the user can retry without re-proposing the action.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{PendingCallId, RequestIdentity, ToolError};
use crate::domain::tools::{PendingToolCall, ToolCall, ToolExecutionResult, DEFAULT_TTL_SECS};
use crate::ports::PendingCallStore;

use super::preview::PreviewGenerator;
use super::sync::ExecutionPipeline;

/// Outcome of proposing a tool call.
#[derive(Debug, Clone)]
pub enum ProposalOutcome {
    /// The call was confirmation-exempt and has executed.
    Executed(ToolExecutionResult),
    /// The call is parked and awaits user confirmation.
    ConfirmationRequired(PendingToolCall),
}

/// Drives the propose → confirm/cancel lifecycle.
pub struct ConfirmationService {
    store: Arc<dyn PendingCallStore>,
    previews: Arc<PreviewGenerator>,
    pipeline: Arc<ExecutionPipeline>,
    ttl_secs: i64,
}

impl ConfirmationService {
    /// Creates a service with the default pending-call TTL.
    pub fn new(
        store: Arc<dyn PendingCallStore>,
        previews: Arc<PreviewGenerator>,
        pipeline: Arc<ExecutionPipeline>,
    ) -> Self {
        Self::with_ttl_secs(store, previews, pipeline, DEFAULT_TTL_SECS)
    }

    /// Creates a service with an explicit TTL in seconds.
    pub fn with_ttl_secs(
        store: Arc<dyn PendingCallStore>,
        previews: Arc<PreviewGenerator>,
        pipeline: Arc<ExecutionPipeline>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            store,
            previews,
            pipeline,
            ttl_secs,
        }
    }

    /// Proposes a tool call.
    ///
    /// Confirmation-exempt calls (all queries) execute immediately.
    /// Everything else is previewed and parked; a storage failure while
    /// parking propagates, so the caller never believes an unparked
    /// call is awaiting confirmation.
    pub async fn propose(
        &self,
        call: &ToolCall,
        identity: &RequestIdentity,
    ) -> Result<ProposalOutcome, ToolError> {
        let ctx = identity.require()?;
        let preview = self
            .previews
            .generate(call.name(), call.arguments(), &ctx)
            .await?;

        if !preview.requires_confirmation {
            let result = self.pipeline.execute_with_sync(call, identity).await?;
            return Ok(ProposalOutcome::Executed(result));
        }

        let parked = PendingToolCall::with_ttl_secs(
            ctx.user_id,
            ctx.tenant_id,
            preview.tool_name,
            call.arguments().clone(),
            preview,
            self.ttl_secs,
        );
        self.store
            .put(parked.clone())
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        Ok(ProposalOutcome::ConfirmationRequired(parked))
    }

    /// Confirms a pending call and executes it.
    ///
    /// Fails with `NotFound` when the id is unknown, expired, owned by
    /// another tenant, or already claimed by a racing confirm/cancel.
    /// If execution fails, the record is re-parked so confirmation can
    /// be retried.
    pub async fn confirm(
        &self,
        id: PendingCallId,
        identity: &RequestIdentity,
    ) -> Result<ToolExecutionResult, ToolError> {
        let ctx = identity.require()?;

        let call = self
            .store
            .get(id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?
            .filter(|call| call.tenant_id() == ctx.tenant_id)
            .ok_or_else(|| ToolError::not_found("Pending call", id.to_string()))?;

        // Claim the record before executing; the loser of a race gets
        // NotFound here and never executes.
        let claimed = self
            .store
            .delete(id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;
        if !claimed {
            return Err(ToolError::not_found("Pending call", id.to_string()));
        }

        let replayed = ToolCall::new(call.tool_name().as_str(), call.arguments().clone());
        let result = self.pipeline.execute_with_sync(&replayed, identity).await;

        match result {
            Ok(result) => Ok(result),
            Err(err) => {
                // Execution failed: re-park the call (same id, same
                // expiry) so the user can retry confirmation.
                if let Err(put_err) = self.store.put(call).await {
                    warn!(pending_call_id = %id, error = %put_err, "failed to re-park pending call");
                }
                Err(err)
            }
        }
    }

    /// Cancels a pending call.
    ///
    /// Fails with `NotFound` when the id is unknown, expired, owned by
    /// another tenant, or already claimed.
    pub async fn cancel(&self, id: PendingCallId, identity: &RequestIdentity) -> Result<(), ToolError> {
        let ctx = identity.require()?;

        self.store
            .get(id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?
            .filter(|call| call.tenant_id() == ctx.tenant_id)
            .ok_or_else(|| ToolError::not_found("Pending call", id.to_string()))?;

        let claimed = self
            .store
            .delete(id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;
        if !claimed {
            return Err(ToolError::not_found("Pending call", id.to_string()));
        }
        Ok(())
    }

    /// All non-expired pending calls proposed by the calling user.
    pub async fn pending_for_user(
        &self,
        identity: &RequestIdentity,
    ) -> Result<Vec<PendingToolCall>, ToolError> {
        let ctx = identity.require()?;
        self.store
            .list_for_user(&ctx.user_id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))
    }
}
