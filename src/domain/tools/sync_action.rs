//! Sync actions - cache invalidation messages broadcast after mutations.
//!
//! A sync action says "these cached query results are now stale". It is
//! published on the broadcast channel for live clients and appended to a
//! durable log so reconnecting clients can replay what they missed.
//! Append-only; never mutated.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SyncActionId, TenantId, Timestamp, UserId};

use super::ToolName;

/// The kind of data change a sync action describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncActionType {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for SyncActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A cache-invalidation message for one committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAction {
    /// Unique id of this action.
    pub id: SyncActionId,
    /// What kind of change happened.
    #[serde(rename = "type")]
    pub action_type: SyncActionType,
    /// Which module's data changed (e.g. "guests", "timeline").
    pub module: String,
    /// Primary entity affected, as a string id.
    pub entity_id: String,
    /// Change payload handed to clients (may be a summary).
    pub data: serde_json::Value,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Narrower scope within the tenant (e.g. a client id), if any.
    pub scope_id: Option<String>,
    /// User whose call caused the change.
    pub user_id: UserId,
    /// When the action was created.
    pub timestamp: Timestamp,
    /// Cached query identifiers now stale.
    pub query_paths: Vec<String>,
    /// The tool that caused the change.
    pub tool_name: ToolName,
}

impl SyncAction {
    /// Creates a new sync action with a fresh id and current timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action_type: SyncActionType,
        module: impl Into<String>,
        entity_id: impl Into<String>,
        data: serde_json::Value,
        tenant_id: TenantId,
        scope_id: Option<String>,
        user_id: UserId,
        query_paths: Vec<String>,
        tool_name: ToolName,
    ) -> Self {
        Self {
            id: SyncActionId::new(),
            action_type,
            module: module.into(),
            entity_id: entity_id.into(),
            data,
            tenant_id,
            scope_id,
            user_id,
            timestamp: Timestamp::now(),
            query_paths,
            tool_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_action() -> SyncAction {
        SyncAction::new(
            SyncActionType::Insert,
            "guests",
            "g-1",
            json!({"firstName": "Ana"}),
            TenantId::new(),
            Some("c1".into()),
            UserId::new("u-1"),
            vec!["guests.list".into(), "guests.count".into()],
            ToolName::AddGuest,
        )
    }

    #[test]
    fn new_actions_get_fresh_ids() {
        assert_ne!(sample_action().id, sample_action().id);
    }

    #[test]
    fn action_serializes_with_wire_type_key() {
        let json = serde_json::to_string(&sample_action()).unwrap();
        assert!(json.contains("\"type\":\"insert\""));
        assert!(json.contains("guests.list"));
    }

    #[test]
    fn action_roundtrips_through_json() {
        let action = sample_action();
        let restored: SyncAction =
            serde_json::from_str(&serde_json::to_string(&action).unwrap()).unwrap();

        assert_eq!(restored.id, action.id);
        assert_eq!(restored.action_type, SyncActionType::Insert);
        assert_eq!(restored.query_paths.len(), 2);
        assert_eq!(restored.tool_name, ToolName::AddGuest);
    }
}
