//! Pending tool call entity - a mutation held for user confirmation.
//!
//! When a mutating tool's preview says confirmation is required, the
//! call is parked here with a time-to-live. Exactly one outcome may
//! occur: confirmed (and executed), cancelled, or expired. A second
//! confirm or cancel for the same id fails with not-found because the
//! record is gone.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PendingCallId, TenantId, Timestamp, UserId};

use super::{ToolName, ToolPreview};

/// Default time-to-live for a pending call.
///
/// Five minutes is a deliberate trade-off: losing an unconfirmed action
/// on crash is acceptable, so the store favors low write latency over
/// stronger durability.
pub const DEFAULT_TTL_SECS: i64 = 300;

/// A mutating tool call awaiting explicit user confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingToolCall {
    /// Opaque, caller-unguessable identifier. Never reused.
    id: PendingCallId,

    /// User who proposed the call.
    user_id: UserId,

    /// Tenant whose data the call operates on.
    tenant_id: TenantId,

    /// The tool to execute on confirmation.
    tool_name: ToolName,

    /// Raw arguments, exactly as proposed.
    arguments: serde_json::Value,

    /// The preview shown to the user.
    preview: ToolPreview,

    /// When the call was parked.
    created_at: Timestamp,

    /// When the call lapses.
    expires_at: Timestamp,
}

impl PendingToolCall {
    /// Parks a new pending call with the default TTL.
    pub fn new(
        user_id: UserId,
        tenant_id: TenantId,
        tool_name: ToolName,
        arguments: serde_json::Value,
        preview: ToolPreview,
    ) -> Self {
        Self::with_ttl_secs(user_id, tenant_id, tool_name, arguments, preview, DEFAULT_TTL_SECS)
    }

    /// Parks a new pending call with an explicit TTL in seconds.
    pub fn with_ttl_secs(
        user_id: UserId,
        tenant_id: TenantId,
        tool_name: ToolName,
        arguments: serde_json::Value,
        preview: ToolPreview,
        ttl_secs: i64,
    ) -> Self {
        let created_at = Timestamp::now();
        Self {
            id: PendingCallId::new(),
            user_id,
            tenant_id,
            tool_name,
            arguments,
            preview,
            created_at,
            expires_at: created_at.plus_secs(ttl_secs),
        }
    }

    /// Reconstructs a pending call from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PendingCallId,
        user_id: UserId,
        tenant_id: TenantId,
        tool_name: ToolName,
        arguments: serde_json::Value,
        preview: ToolPreview,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            tenant_id,
            tool_name,
            arguments,
            preview,
            created_at,
            expires_at,
        }
    }

    /// The opaque id.
    pub fn id(&self) -> PendingCallId {
        self.id
    }

    /// The proposing user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The owning tenant.
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// The tool to execute on confirmation.
    pub fn tool_name(&self) -> ToolName {
        self.tool_name
    }

    /// The raw arguments.
    pub fn arguments(&self) -> &serde_json::Value {
        &self.arguments
    }

    /// The preview shown to the user.
    pub fn preview(&self) -> &ToolPreview {
        &self.preview
    }

    /// When the call was parked.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the call lapses.
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Whether the call has lapsed as of `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.is_after(&self.expires_at)
    }

    /// Whether the call has lapsed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// Overrides the expiry (test support for lapse scenarios).
    pub fn with_expires_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = expires_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::registry;
    use serde_json::json;

    fn sample_preview(tool: ToolName) -> ToolPreview {
        let meta = registry().metadata(tool);
        ToolPreview {
            tool_name: tool,
            action_label: meta.action_label.to_string(),
            description: format!("Execute {}", tool),
            fields: vec![],
            cascade_effects: vec![],
            warnings: vec![],
            requires_confirmation: true,
        }
    }

    fn sample_call() -> PendingToolCall {
        PendingToolCall::new(
            UserId::new("u-1"),
            TenantId::new(),
            ToolName::AddGuest,
            json!({"clientId": "c1", "firstName": "Ana"}),
            sample_preview(ToolName::AddGuest),
        )
    }

    #[test]
    fn new_call_uses_default_ttl() {
        let call = sample_call();
        let ttl = call.expires_at().duration_since(&call.created_at());
        assert_eq!(ttl.num_seconds(), DEFAULT_TTL_SECS);
    }

    #[test]
    fn new_call_is_not_expired() {
        assert!(!sample_call().is_expired());
    }

    #[test]
    fn call_with_past_expiry_is_expired() {
        let call = sample_call().with_expires_at(Timestamp::now().plus_millis(-1));
        assert!(call.is_expired());
    }

    #[test]
    fn is_expired_at_respects_boundary() {
        let call = sample_call();
        let before = call.expires_at().plus_millis(-1);
        let after = call.expires_at().plus_millis(1);

        assert!(!call.is_expired_at(before));
        assert!(call.is_expired_at(after));
    }

    #[test]
    fn ids_are_unique_across_calls() {
        assert_ne!(sample_call().id(), sample_call().id());
    }

    #[test]
    fn call_roundtrips_through_json() {
        let call = sample_call();
        let json = serde_json::to_string(&call).unwrap();
        let restored: PendingToolCall = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id(), call.id());
        assert_eq!(restored.tool_name(), ToolName::AddGuest);
        assert_eq!(restored.arguments()["firstName"], "Ana");
    }
}
