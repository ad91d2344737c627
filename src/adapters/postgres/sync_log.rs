//! PostgreSQL implementation of the durable sync action log.
//!
//! Append-only. Reconnecting clients replay the actions recorded after
//! the timestamp of the last action they saw.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{SyncActionId, TenantId, Timestamp, UserId};
use crate::domain::tools::{SyncAction, SyncActionType, ToolName};
use crate::ports::{SyncLog, SyncLogError};

/// PostgreSQL implementation of [`SyncLog`].
#[derive(Clone)]
pub struct PostgresSyncLog {
    pool: PgPool,
}

impl PostgresSyncLog {
    /// Creates a new log.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncLog for PostgresSyncLog {
    async fn append(&self, action: &SyncAction) -> Result<(), SyncLogError> {
        sqlx::query(
            r#"
            INSERT INTO sync_actions (
                id, action_type, module, entity_id, data, tenant_id,
                scope_id, user_id, occurred_at, query_paths, tool_name
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(action.id.as_uuid())
        .bind(action.action_type.to_string())
        .bind(&action.module)
        .bind(&action.entity_id)
        .bind(&action.data)
        .bind(action.tenant_id.as_uuid())
        .bind(&action.scope_id)
        .bind(action.user_id.as_str())
        .bind(action.timestamp.as_datetime())
        .bind(&action.query_paths)
        .bind(action.tool_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SyncLogError::storage(format!("Failed to append sync action: {}", e)))?;

        Ok(())
    }

    async fn replay_since(
        &self,
        tenant_id: TenantId,
        since: Timestamp,
    ) -> Result<Vec<SyncAction>, SyncLogError> {
        let rows = sqlx::query(
            r#"
            SELECT id, action_type, module, entity_id, data, tenant_id,
                   scope_id, user_id, occurred_at, query_paths, tool_name
            FROM sync_actions
            WHERE tenant_id = $1 AND occurred_at > $2
            ORDER BY occurred_at
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(since.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncLogError::storage(format!("Failed to replay sync actions: {}", e)))?;

        rows.into_iter().map(row_to_sync_action).collect()
    }
}

fn row_to_sync_action(row: sqlx::postgres::PgRow) -> Result<SyncAction, SyncLogError> {
    let action_type = match row.get::<String, _>("action_type").as_str() {
        "insert" => SyncActionType::Insert,
        "update" => SyncActionType::Update,
        "delete" => SyncActionType::Delete,
        other => {
            return Err(SyncLogError::serialization(format!(
                "Unknown sync action type: {}",
                other
            )))
        }
    };

    let tool_name: String = row.get("tool_name");
    let tool_name =
        ToolName::parse(&tool_name).map_err(|e| SyncLogError::serialization(e.to_string()))?;

    Ok(SyncAction {
        id: SyncActionId::from_uuid(row.get("id")),
        action_type,
        module: row.get("module"),
        entity_id: row.get("entity_id"),
        data: row.get("data"),
        tenant_id: TenantId::from_uuid(row.get("tenant_id")),
        scope_id: row.get("scope_id"),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        timestamp: Timestamp::from_datetime(row.get("occurred_at")),
        query_paths: row.get("query_paths"),
        tool_name,
    })
}
