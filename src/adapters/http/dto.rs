//! Request/response DTOs for the assistant endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EntityCandidate, ToolError};
use crate::domain::tools::{PendingToolCall, ToolExecutionResult, ToolPreview};

/// Body of `POST /api/assistant/execute` and `/preview`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Body of `POST /api/assistant/confirm` and `/cancel`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    pub pending_call_id: String,
}

/// A proposal outcome on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposeResponse {
    /// Confirmation-exempt call that has already executed.
    Executed { result: ToolExecutionResult },
    /// Parked call awaiting confirmation.
    ConfirmationRequired {
        pending_call_id: String,
        preview: ToolPreview,
        expires_at: String,
    },
}

/// A parked call on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct PendingCallRecord {
    pub pending_call_id: String,
    pub tool_name: String,
    pub preview: ToolPreview,
    pub created_at: String,
    pub expires_at: String,
}

impl From<&PendingToolCall> for PendingCallRecord {
    fn from(call: &PendingToolCall) -> Self {
        Self {
            pending_call_id: call.id().to_string(),
            tool_name: call.tool_name().to_string(),
            preview: call.preview().clone(),
            created_at: call.created_at().to_string(),
            expires_at: call.expires_at().to_string(),
        }
    }
}

/// Error body shared by all endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<EntityCandidate>>,
}

impl From<&ToolError> for ErrorResponse {
    fn from(err: &ToolError) -> Self {
        let candidates = match err {
            ToolError::Ambiguous { candidates, .. } => Some(candidates.clone()),
            _ => None,
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::EntityId;

    #[test]
    fn error_response_carries_code_and_message() {
        let err = ToolError::UnknownTool("summon_dragon".into());
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "UNKNOWN_TOOL");
        assert!(body.message.contains("summon_dragon"));
        assert!(body.candidates.is_none());
    }

    #[test]
    fn ambiguous_error_response_includes_candidates() {
        let err = ToolError::ambiguous(
            "Ana",
            vec![EntityCandidate::new(EntityId::new(), "Ana Silva")],
        );
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "AMBIGUOUS");
        assert_eq!(body.candidates.unwrap().len(), 1);
    }
}
