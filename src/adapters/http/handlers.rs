//! HTTP handlers for the assistant endpoints.
//!
//! Authentication happens upstream; these handlers read the
//! pre-validated identity from the `x-user-id` / `x-tenant-id` headers
//! and let the dispatcher reject calls where either is missing.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::application::{ConfirmationService, PreviewGenerator, ProposalOutcome};
use crate::domain::foundation::{PendingCallId, RequestIdentity, TenantId, Timestamp, ToolError, UserId};
use crate::domain::tools::ToolCall;
use crate::ports::SyncLog;

use super::dto::{
    ConfirmRequest, ErrorResponse, ExecuteRequest, PendingCallRecord, ProposeResponse,
};

/// Application state for the assistant endpoints.
#[derive(Clone)]
pub struct AssistantAppState {
    /// Preview generator (read-only path).
    pub previews: Arc<PreviewGenerator>,
    /// Propose/confirm/cancel lifecycle.
    pub confirmations: Arc<ConfirmationService>,
    /// Durable sync log, for client replay.
    pub sync_log: Arc<dyn SyncLog>,
}

/// Extracts the pre-validated identity headers.
fn identity_from(headers: &HeaderMap) -> RequestIdentity {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(UserId::new);
    let tenant_id = headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<TenantId>().ok());
    RequestIdentity { user_id, tenant_id }
}

fn error_status(err: &ToolError) -> StatusCode {
    match err {
        ToolError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ToolError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ToolError::UnknownTool(_) | ToolError::NotFound { .. } => StatusCode::NOT_FOUND,
        ToolError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        ToolError::Ambiguous { .. } => StatusCode::CONFLICT,
        ToolError::TransactionFailed(_) | ToolError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_reply(err: ToolError) -> (StatusCode, Json<ErrorResponse>) {
    (error_status(&err), Json(ErrorResponse::from(&err)))
}

/// Preview a proposed tool call without executing anything.
///
/// POST /api/assistant/preview
pub async fn preview_tool(
    State(state): State<AssistantAppState>,
    headers: HeaderMap,
    Json(request): Json<ExecuteRequest>,
) -> impl IntoResponse {
    let identity = identity_from(&headers);
    let ctx = match identity.require() {
        Ok(ctx) => ctx,
        Err(err) => return error_reply(err).into_response(),
    };

    match state
        .previews
        .generate(&request.tool_name, &request.arguments, &ctx)
        .await
    {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(err) => error_reply(err).into_response(),
    }
}

/// Propose a tool call: executes confirmation-exempt calls, parks the
/// rest for confirmation.
///
/// POST /api/assistant/execute
pub async fn execute_tool(
    State(state): State<AssistantAppState>,
    headers: HeaderMap,
    Json(request): Json<ExecuteRequest>,
) -> impl IntoResponse {
    let identity = identity_from(&headers);
    let call = ToolCall::new(request.tool_name, request.arguments);

    match state.confirmations.propose(&call, &identity).await {
        Ok(ProposalOutcome::Executed(result)) => {
            (StatusCode::OK, Json(ProposeResponse::Executed { result })).into_response()
        }
        Ok(ProposalOutcome::ConfirmationRequired(call)) => (
            StatusCode::ACCEPTED,
            Json(ProposeResponse::ConfirmationRequired {
                pending_call_id: call.id().to_string(),
                preview: call.preview().clone(),
                expires_at: call.expires_at().to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_reply(err).into_response(),
    }
}

/// Confirm a parked call.
///
/// POST /api/assistant/confirm
pub async fn confirm_tool(
    State(state): State<AssistantAppState>,
    headers: HeaderMap,
    Json(request): Json<ConfirmRequest>,
) -> impl IntoResponse {
    let identity = identity_from(&headers);
    let id = match request.pending_call_id.parse::<PendingCallId>() {
        Ok(id) => id,
        Err(_) => {
            return error_reply(ToolError::bad_request("Invalid pending_call_id format"))
                .into_response()
        }
    };

    match state.confirmations.confirm(id, &identity).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_reply(err).into_response(),
    }
}

/// Cancel a parked call.
///
/// POST /api/assistant/cancel
pub async fn cancel_tool(
    State(state): State<AssistantAppState>,
    headers: HeaderMap,
    Json(request): Json<ConfirmRequest>,
) -> impl IntoResponse {
    let identity = identity_from(&headers);
    let id = match request.pending_call_id.parse::<PendingCallId>() {
        Ok(id) => id,
        Err(_) => {
            return error_reply(ToolError::bad_request("Invalid pending_call_id format"))
                .into_response()
        }
    };

    match state.confirmations.cancel(id, &identity).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_reply(err).into_response(),
    }
}

/// List the caller's parked calls (multi-session visibility).
///
/// GET /api/assistant/pending
pub async fn list_pending(
    State(state): State<AssistantAppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let identity = identity_from(&headers);

    match state.confirmations.pending_for_user(&identity).await {
        Ok(calls) => {
            let records: Vec<PendingCallRecord> =
                calls.iter().map(PendingCallRecord::from).collect();
            (StatusCode::OK, Json(records)).into_response()
        }
        Err(err) => error_reply(err).into_response(),
    }
}

/// Query string of the replay endpoint.
#[derive(Debug, Deserialize)]
pub struct ReplayQuery {
    /// RFC 3339 timestamp of the last action the client saw.
    pub since: String,
}

/// Replay sync actions a reconnecting client missed.
///
/// GET /api/sync/replay?since=2026-08-01T12:00:00Z
pub async fn replay_sync(
    State(state): State<AssistantAppState>,
    headers: HeaderMap,
    Query(query): Query<ReplayQuery>,
) -> impl IntoResponse {
    let identity = identity_from(&headers);
    let ctx = match identity.require() {
        Ok(ctx) => ctx,
        Err(err) => return error_reply(err).into_response(),
    };

    let since = match chrono::DateTime::parse_from_rfc3339(&query.since) {
        Ok(dt) => Timestamp::from_datetime(dt.with_timezone(&chrono::Utc)),
        Err(_) => {
            return error_reply(ToolError::bad_request("Invalid 'since' timestamp"))
                .into_response()
        }
    };

    match state.sync_log.replay_since(ctx.tenant_id, since).await {
        Ok(actions) => (StatusCode::OK, Json(actions)).into_response(),
        Err(err) => error_reply(ToolError::internal(err.to_string())).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_parses_both_headers() {
        let tenant = TenantId::new();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "u-1".parse().unwrap());
        headers.insert("x-tenant-id", tenant.to_string().parse().unwrap());

        let identity = identity_from(&headers);
        assert_eq!(identity.user_id.unwrap().as_str(), "u-1");
        assert_eq!(identity.tenant_id.unwrap(), tenant);
    }

    #[test]
    fn identity_tolerates_missing_headers() {
        let identity = identity_from(&HeaderMap::new());
        assert!(identity.user_id.is_none());
        assert!(identity.tenant_id.is_none());
        assert!(identity.require().is_err());
    }

    #[test]
    fn identity_rejects_malformed_tenant() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "u-1".parse().unwrap());
        headers.insert("x-tenant-id", "not-a-uuid".parse().unwrap());

        let identity = identity_from(&headers);
        assert!(identity.tenant_id.is_none());
    }

    #[test]
    fn error_statuses_follow_the_taxonomy() {
        assert_eq!(error_status(&ToolError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            error_status(&ToolError::bad_request("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&ToolError::UnknownTool("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&ToolError::NotImplemented("x".into())),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            error_status(&ToolError::ambiguous("x", vec![])),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&ToolError::TransactionFailed("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
