//! PostgreSQL implementation of the planning reader.
//!
//! Read-only queries for entity resolution and preview warning checks.
//! Name matching is case-insensitive on the whitespace-normalized name;
//! duplicates additionally match on exact email or phone.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{EntityId, TenantId, Timestamp};
use crate::domain::planning::{
    BudgetItemRecord, BudgetSummary, ClientRef, GuestRecord, TimelineItemRecord, VendorRecord,
};
use crate::domain::tools::RsvpStatus;
use crate::ports::{PlanningReader, StoreError};

use super::planning_store::{row_to_guest, rsvp_to_str};

/// PostgreSQL implementation of [`PlanningReader`].
#[derive(Clone)]
pub struct PostgresPlanningReader {
    pool: PgPool,
}

impl PostgresPlanningReader {
    /// Creates a new reader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const GUEST_COLUMNS: &str = r#"
    g.id, g.client_id, g.first_name, g.last_name, g.email, g.phone,
    g.rsvp_status, g.dietary_notes,
    (SELECT label FROM seating_assignments s WHERE s.guest_id = g.id) AS seat_assignment
"#;

#[async_trait]
impl PlanningReader for PostgresPlanningReader {
    async fn resolve_client(
        &self,
        tenant_id: TenantId,
        reference: &str,
    ) -> Result<Option<ClientRef>, StoreError> {
        // An id reference resolves directly; anything else matches on
        // the normalized name (unique per tenant).
        if let Ok(id) = reference.parse::<EntityId>() {
            let row = sqlx::query("SELECT id, name FROM clients WHERE id = $1 AND tenant_id = $2")
                .bind(id.as_uuid())
                .bind(tenant_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::storage(format!("Failed to resolve client: {}", e)))?;
            if let Some(row) = row {
                return Ok(Some(ClientRef::new(
                    EntityId::from_uuid(row.get("id")),
                    row.get::<String, _>("name"),
                )));
            }
        }

        let row = sqlx::query(
            r#"
            SELECT id, name FROM clients
            WHERE tenant_id = $1 AND LOWER(TRIM(name)) = LOWER(TRIM($2))
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to resolve client: {}", e)))?;

        Ok(row.map(|row| {
            ClientRef::new(EntityId::from_uuid(row.get("id")), row.get::<String, _>("name"))
        }))
    }

    async fn guests_matching(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        query: &str,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            WHERE g.tenant_id = $1 AND g.client_id = $2
              AND (
                LOWER(TRIM(CONCAT_WS(' ', g.first_name, g.last_name))) = LOWER(TRIM($3))
                OR LOWER(TRIM(g.first_name)) = LOWER(TRIM($3))
              )
            ORDER BY g.first_name, g.last_name
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to match guests: {}", e)))?;

        Ok(rows.iter().map(row_to_guest).collect())
    }

    async fn find_guest_duplicates(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            WHERE g.tenant_id = $1 AND g.client_id = $2
              AND (
                LOWER(TRIM(CONCAT_WS(' ', g.first_name, g.last_name))) = LOWER(TRIM($3))
                OR ($4::text IS NOT NULL AND g.email = $4)
                OR ($5::text IS NOT NULL AND g.phone = $5)
              )
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to check guest duplicates: {}", e)))?;

        Ok(rows.iter().map(row_to_guest).collect())
    }

    async fn guests(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        rsvp_status: Option<RsvpStatus>,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            WHERE g.tenant_id = $1 AND g.client_id = $2
              AND ($3::text IS NULL OR g.rsvp_status = $3)
            ORDER BY g.first_name, g.last_name
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(rsvp_status.map(rsvp_to_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to list guests: {}", e)))?;

        Ok(rows.iter().map(row_to_guest).collect())
    }

    async fn timeline_items(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<Vec<TimelineItemRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, title, starts_at, ends_at, location
            FROM timeline_items
            WHERE tenant_id = $1 AND client_id = $2
            ORDER BY starts_at
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to list timeline items: {}", e)))?;

        Ok(rows.iter().map(row_to_timeline_item).collect())
    }

    async fn timeline_items_titled(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        title: &str,
    ) -> Result<Vec<TimelineItemRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, title, starts_at, ends_at, location
            FROM timeline_items
            WHERE tenant_id = $1 AND client_id = $2
              AND LOWER(TRIM(title)) = LOWER(TRIM($3))
            ORDER BY starts_at
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(title)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to find timeline items: {}", e)))?;

        Ok(rows.iter().map(row_to_timeline_item).collect())
    }

    async fn budget_items(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<Vec<BudgetItemRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, name, amount, paid, category, vendor_name
            FROM budget_items
            WHERE tenant_id = $1 AND client_id = $2
            ORDER BY name
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to list budget items: {}", e)))?;

        Ok(rows.iter().map(row_to_budget_item).collect())
    }

    async fn budget_items_named(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        name: &str,
    ) -> Result<Vec<BudgetItemRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, name, amount, paid, category, vendor_name
            FROM budget_items
            WHERE tenant_id = $1 AND client_id = $2
              AND LOWER(TRIM(name)) = LOWER(TRIM($3))
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to find budget items: {}", e)))?;

        Ok(rows.iter().map(row_to_budget_item).collect())
    }

    async fn budget_summary(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<BudgetSummary, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT c.total_budget,
                   COALESCE(SUM(b.amount), 0) AS allocated,
                   COALESCE(SUM(b.amount) FILTER (WHERE b.paid), 0) AS paid
            FROM clients c
            LEFT JOIN budget_items b ON b.client_id = c.id
            WHERE c.id = $1 AND c.tenant_id = $2
            GROUP BY c.total_budget
            "#,
        )
        .bind(client_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to read budget summary: {}", e)))?;

        match row {
            Some(row) => Ok(BudgetSummary {
                total_budget: row.get("total_budget"),
                allocated: row.get("allocated"),
                paid: row.get("paid"),
            }),
            None => Err(StoreError::not_found("Client")),
        }
    }

    async fn vendors_matching(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        query: &str,
    ) -> Result<Vec<VendorRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, name, service, email, phone, cost
            FROM vendors
            WHERE tenant_id = $1 AND client_id = $2
              AND LOWER(TRIM(name)) = LOWER(TRIM($3))
            ORDER BY name
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to match vendors: {}", e)))?;

        Ok(rows.iter().map(row_to_vendor).collect())
    }

    async fn find_vendor_duplicates(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<VendorRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, name, service, email, phone, cost
            FROM vendors
            WHERE tenant_id = $1 AND client_id = $2
              AND (
                LOWER(TRIM(name)) = LOWER(TRIM($3))
                OR ($4::text IS NOT NULL AND email = $4)
                OR ($5::text IS NOT NULL AND phone = $5)
              )
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(name)
        .bind(email)
        .bind(phone)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to check vendor duplicates: {}", e)))?;

        Ok(rows.iter().map(row_to_vendor).collect())
    }
}

fn row_to_timeline_item(row: &sqlx::postgres::PgRow) -> TimelineItemRecord {
    TimelineItemRecord {
        id: EntityId::from_uuid(row.get("id")),
        client_id: EntityId::from_uuid(row.get("client_id")),
        title: row.get("title"),
        starts_at: Timestamp::from_datetime(row.get("starts_at")),
        ends_at: row
            .get::<Option<chrono::DateTime<chrono::Utc>>, _>("ends_at")
            .map(Timestamp::from_datetime),
        location: row.get("location"),
    }
}

fn row_to_budget_item(row: &sqlx::postgres::PgRow) -> BudgetItemRecord {
    BudgetItemRecord {
        id: EntityId::from_uuid(row.get("id")),
        client_id: EntityId::from_uuid(row.get("client_id")),
        name: row.get("name"),
        amount: row.get("amount"),
        paid: row.get("paid"),
        category: row.get("category"),
        vendor_name: row.get("vendor_name"),
    }
}

fn row_to_vendor(row: &sqlx::postgres::PgRow) -> VendorRecord {
    VendorRecord {
        id: EntityId::from_uuid(row.get("id")),
        client_id: EntityId::from_uuid(row.get("client_id")),
        name: row.get("name"),
        service: row.get("service"),
        email: row.get("email"),
        phone: row.get("phone"),
        cost: row.get("cost"),
    }
}
