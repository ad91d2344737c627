//! PostgreSQL implementation of the pending call store.
//!
//! Uses a relational table as a keyed cache with per-record expiry.
//! Expiry is lazy: a read that finds an expired row deletes it and
//! reports absence; `sweep_expired` bulk-deletes for the external
//! scheduler. The atomic `DELETE ... RETURNING` in [`delete`] is what
//! resolves racing confirm/cancel calls: only one caller sees a row.
//!
//! [`delete`]: PendingCallStore::delete

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{PendingCallId, TenantId, Timestamp, UserId};
use crate::domain::tools::{PendingToolCall, ToolName};
use crate::ports::{PendingCallStore, PendingCallStoreError};

/// PostgreSQL implementation of [`PendingCallStore`].
#[derive(Clone)]
pub struct PostgresPendingCallRepository {
    pool: PgPool,
}

impl PostgresPendingCallRepository {
    /// Creates a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingCallStore for PostgresPendingCallRepository {
    async fn put(&self, call: PendingToolCall) -> Result<(), PendingCallStoreError> {
        let preview = serde_json::to_value(call.preview())
            .map_err(|e| PendingCallStoreError::serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO pending_tool_calls (
                id, user_id, tenant_id, tool_name, arguments, preview, created_at, expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(call.id().as_uuid())
        .bind(call.user_id().as_str())
        .bind(call.tenant_id().as_uuid())
        .bind(call.tool_name().as_str())
        .bind(call.arguments())
        .bind(&preview)
        .bind(call.created_at().as_datetime())
        .bind(call.expires_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            PendingCallStoreError::storage(format!("Failed to insert pending call: {}", e))
        })?;

        Ok(())
    }

    async fn get(
        &self,
        id: PendingCallId,
    ) -> Result<Option<PendingToolCall>, PendingCallStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, tenant_id, tool_name, arguments, preview, created_at, expires_at
            FROM pending_tool_calls
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            PendingCallStoreError::storage(format!("Failed to fetch pending call: {}", e))
        })?;

        let Some(row) = row else {
            return Ok(None);
        };
        let call = row_to_pending_call(row)?;

        if call.is_expired() {
            // Lazy expiry: drop the lapsed row and report absence.
            sqlx::query("DELETE FROM pending_tool_calls WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    PendingCallStoreError::storage(format!(
                        "Failed to delete expired pending call: {}",
                        e
                    ))
                })?;
            return Ok(None);
        }

        Ok(Some(call))
    }

    async fn delete(&self, id: PendingCallId) -> Result<bool, PendingCallStoreError> {
        let result = sqlx::query("DELETE FROM pending_tool_calls WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                PendingCallStoreError::storage(format!("Failed to delete pending call: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PendingToolCall>, PendingCallStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, tenant_id, tool_name, arguments, preview, created_at, expires_at
            FROM pending_tool_calls
            WHERE user_id = $1 AND expires_at > NOW()
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            PendingCallStoreError::storage(format!("Failed to list pending calls: {}", e))
        })?;

        rows.into_iter().map(row_to_pending_call).collect()
    }

    async fn sweep_expired(&self) -> Result<u64, PendingCallStoreError> {
        let result = sqlx::query("DELETE FROM pending_tool_calls WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                PendingCallStoreError::storage(format!("Failed to sweep pending calls: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}

fn row_to_pending_call(
    row: sqlx::postgres::PgRow,
) -> Result<PendingToolCall, PendingCallStoreError> {
    let tool_name: String = row.get("tool_name");
    let tool_name = ToolName::parse(&tool_name)
        .map_err(|e| PendingCallStoreError::serialization(e.to_string()))?;

    let preview = serde_json::from_value(row.get("preview"))
        .map_err(|e| PendingCallStoreError::serialization(e.to_string()))?;

    Ok(PendingToolCall::from_parts(
        PendingCallId::from_uuid(row.get("id")),
        UserId::new(row.get::<String, _>("user_id")),
        TenantId::from_uuid(row.get("tenant_id")),
        tool_name,
        row.get("arguments"),
        preview,
        Timestamp::from_datetime(row.get("created_at")),
        Timestamp::from_datetime(row.get("expires_at")),
    ))
}
