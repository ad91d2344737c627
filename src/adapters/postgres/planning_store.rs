//! PostgreSQL implementation of the planning store.
//!
//! Every mutation runs inside the transaction runner, so transient
//! conflicts retry the whole unit of work and a failure anywhere rolls
//! back everything. `create_client_with_defaults` is the cascade case:
//! the client row, its default event, and its starting budget
//! allocation commit together or not at all.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::foundation::{EntityId, TenantId};
use crate::domain::planning::{
    BudgetItemRecord, ClientRef, GuestRecord, TimelineItemRecord, VendorRecord,
};
use crate::domain::tools::RsvpStatus;
use crate::ports::{
    BudgetItemPatch, ClientCascade, GuestPatch, NewBudgetItem, NewClient, NewGuest,
    NewTimelineItem, NewVendor, PlanningStore, StoreError, VendorPatch,
};

use super::transaction::{CascadeOp, TransactionRunner, TxOp, TxOpError};

/// PostgreSQL implementation of [`PlanningStore`].
#[derive(Clone)]
pub struct PostgresPlanningStore {
    runner: TransactionRunner,
}

impl PostgresPlanningStore {
    /// Creates a new store with the default retry policy.
    pub fn new(pool: PgPool) -> Self {
        Self {
            runner: TransactionRunner::new(pool),
        }
    }

    /// Creates a store around an existing runner.
    pub fn with_runner(runner: TransactionRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl PlanningStore for PostgresPlanningStore {
    async fn create_client_with_defaults(
        &self,
        tenant_id: TenantId,
        client: NewClient,
    ) -> Result<ClientCascade, StoreError> {
        let main: TxOp<ClientRef> =
            Box::new(move |tx| Box::pin(insert_client_tx(tx, tenant_id, client.clone())));

        let seed_event: CascadeOp<ClientRef, (String, EntityId)> = Box::new(move |tx, client| {
            Box::pin(seed_default_event_tx(tx, tenant_id, client.id, client.name.clone()))
        });
        let seed_allocation: CascadeOp<ClientRef, (String, EntityId)> =
            Box::new(move |tx, client| {
                Box::pin(seed_budget_allocation_tx(tx, tenant_id, client.id))
            });

        let outcome = self
            .runner
            .run_with_cascade(main, vec![seed_event, seed_allocation])
            .await?;

        let mut event_id = None;
        let mut budget_allocation_id = None;
        for (kind, id) in &outcome.cascade {
            match kind.as_str() {
                "event" => event_id = Some(*id),
                "budget_allocation" => budget_allocation_id = Some(*id),
                _ => {}
            }
        }

        Ok(ClientCascade {
            client: outcome.main,
            event_id: event_id
                .ok_or_else(|| StoreError::storage("cascade did not seed an event"))?,
            budget_allocation_id: budget_allocation_id
                .ok_or_else(|| StoreError::storage("cascade did not seed a budget allocation"))?,
        })
    }

    async fn insert_guest(
        &self,
        tenant_id: TenantId,
        guest: NewGuest,
    ) -> Result<GuestRecord, StoreError> {
        let op: TxOp<GuestRecord> =
            Box::new(move |tx| Box::pin(insert_guest_tx(tx, tenant_id, guest.clone())));
        self.runner.run(op).await
    }

    async fn update_guest(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
        patch: GuestPatch,
    ) -> Result<GuestRecord, StoreError> {
        let op: TxOp<GuestRecord> =
            Box::new(move |tx| Box::pin(update_guest_tx(tx, tenant_id, guest_id, patch.clone())));
        self.runner.run(op).await
    }

    async fn remove_guest(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
    ) -> Result<(), StoreError> {
        let op: TxOp<()> =
            Box::new(move |tx| Box::pin(remove_guest_tx(tx, tenant_id, guest_id)));
        self.runner.run(op).await
    }

    async fn set_rsvp(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
        status: RsvpStatus,
    ) -> Result<GuestRecord, StoreError> {
        let op: TxOp<GuestRecord> =
            Box::new(move |tx| Box::pin(set_rsvp_tx(tx, tenant_id, guest_id, status)));
        self.runner.run(op).await
    }

    async fn insert_timeline_item(
        &self,
        tenant_id: TenantId,
        item: NewTimelineItem,
    ) -> Result<TimelineItemRecord, StoreError> {
        let op: TxOp<TimelineItemRecord> =
            Box::new(move |tx| Box::pin(insert_timeline_item_tx(tx, tenant_id, item.clone())));
        self.runner.run(op).await
    }

    async fn remove_timeline_item(
        &self,
        tenant_id: TenantId,
        item_id: EntityId,
    ) -> Result<(), StoreError> {
        let op: TxOp<()> =
            Box::new(move |tx| Box::pin(remove_timeline_item_tx(tx, tenant_id, item_id)));
        self.runner.run(op).await
    }

    async fn shift_timeline(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        minutes: i64,
    ) -> Result<u64, StoreError> {
        let op: TxOp<u64> =
            Box::new(move |tx| Box::pin(shift_timeline_tx(tx, tenant_id, client_id, minutes)));
        self.runner.run(op).await
    }

    async fn insert_budget_item(
        &self,
        tenant_id: TenantId,
        item: NewBudgetItem,
    ) -> Result<BudgetItemRecord, StoreError> {
        let op: TxOp<BudgetItemRecord> =
            Box::new(move |tx| Box::pin(insert_budget_item_tx(tx, tenant_id, item.clone())));
        self.runner.run(op).await
    }

    async fn update_budget_item(
        &self,
        tenant_id: TenantId,
        item_id: EntityId,
        patch: BudgetItemPatch,
    ) -> Result<BudgetItemRecord, StoreError> {
        let op: TxOp<BudgetItemRecord> = Box::new(move |tx| {
            Box::pin(update_budget_item_tx(tx, tenant_id, item_id, patch.clone()))
        });
        self.runner.run(op).await
    }

    async fn insert_vendor(
        &self,
        tenant_id: TenantId,
        vendor: NewVendor,
    ) -> Result<VendorRecord, StoreError> {
        let op: TxOp<VendorRecord> =
            Box::new(move |tx| Box::pin(insert_vendor_tx(tx, tenant_id, vendor.clone())));
        self.runner.run(op).await
    }

    async fn update_vendor(
        &self,
        tenant_id: TenantId,
        vendor_id: EntityId,
        patch: VendorPatch,
    ) -> Result<VendorRecord, StoreError> {
        let op: TxOp<VendorRecord> = Box::new(move |tx| {
            Box::pin(update_vendor_tx(tx, tenant_id, vendor_id, patch.clone()))
        });
        self.runner.run(op).await
    }
}

// ----- Transactional operation bodies -----

pub(crate) fn rsvp_to_str(status: RsvpStatus) -> &'static str {
    match status {
        RsvpStatus::Pending => "pending",
        RsvpStatus::Accepted => "accepted",
        RsvpStatus::Declined => "declined",
    }
}

pub(crate) fn rsvp_from_str(s: &str) -> RsvpStatus {
    match s {
        "accepted" => RsvpStatus::Accepted,
        "declined" => RsvpStatus::Declined,
        _ => RsvpStatus::Pending,
    }
}

pub(crate) fn row_to_guest(row: &sqlx::postgres::PgRow) -> GuestRecord {
    GuestRecord {
        id: EntityId::from_uuid(row.get("id")),
        client_id: EntityId::from_uuid(row.get("client_id")),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        rsvp_status: rsvp_from_str(&row.get::<String, _>("rsvp_status")),
        dietary_notes: row.get("dietary_notes"),
        seat_assignment: row.try_get("seat_assignment").unwrap_or(None),
    }
}

async fn insert_client_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    client: NewClient,
) -> Result<ClientRef, TxOpError> {
    let id = EntityId::new();
    sqlx::query(
        r#"
        INSERT INTO clients (id, tenant_id, name, email, phone, event_date, total_budget, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(client.event_date.map(|t| *t.as_datetime()))
    .bind(client.total_budget)
    .execute(&mut **tx)
    .await?;

    Ok(ClientRef::new(id, client.name))
}

async fn seed_default_event_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    client_id: EntityId,
    client_name: String,
) -> Result<(String, EntityId), TxOpError> {
    let id = EntityId::new();
    sqlx::query(
        r#"
        INSERT INTO events (id, tenant_id, client_id, name, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(client_id.as_uuid())
    .bind(format!("{} Main Event", client_name))
    .execute(&mut **tx)
    .await?;

    Ok(("event".to_string(), id))
}

async fn seed_budget_allocation_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    client_id: EntityId,
) -> Result<(String, EntityId), TxOpError> {
    let id = EntityId::new();
    sqlx::query(
        r#"
        INSERT INTO budget_allocations (id, tenant_id, client_id, allocated, created_at)
        VALUES ($1, $2, $3, COALESCE((SELECT total_budget FROM clients WHERE id = $3), 0), NOW())
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(client_id.as_uuid())
    .execute(&mut **tx)
    .await?;

    Ok(("budget_allocation".to_string(), id))
}

async fn insert_guest_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    guest: NewGuest,
) -> Result<GuestRecord, TxOpError> {
    let id = EntityId::new();
    let row = sqlx::query(
        r#"
        INSERT INTO guests (
            id, tenant_id, client_id, first_name, last_name, email, phone,
            side, dietary_notes, rsvp_status, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', NOW())
        RETURNING id, client_id, first_name, last_name, email, phone, rsvp_status,
                  dietary_notes, NULL::text AS seat_assignment
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(guest.client_id.as_uuid())
    .bind(&guest.first_name)
    .bind(&guest.last_name)
    .bind(&guest.email)
    .bind(&guest.phone)
    .bind(&guest.side)
    .bind(&guest.dietary_notes)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row_to_guest(&row))
}

async fn update_guest_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    guest_id: EntityId,
    patch: GuestPatch,
) -> Result<GuestRecord, TxOpError> {
    let row = sqlx::query(
        r#"
        UPDATE guests SET
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            email = COALESCE($5, email),
            phone = COALESCE($6, phone),
            dietary_notes = COALESCE($7, dietary_notes),
            updated_at = NOW()
        WHERE id = $1 AND tenant_id = $2
        RETURNING id, client_id, first_name, last_name, email, phone, rsvp_status,
                  dietary_notes,
                  (SELECT label FROM seating_assignments s WHERE s.guest_id = guests.id)
                      AS seat_assignment
        "#,
    )
    .bind(guest_id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(&patch.dietary_notes)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(|row| row_to_guest(&row))
        .ok_or(TxOpError::NotFound("Guest"))
}

async fn remove_guest_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    guest_id: EntityId,
) -> Result<(), TxOpError> {
    // Release the seat first so the guest row never disappears while a
    // seating row still points at it.
    sqlx::query("DELETE FROM seating_assignments WHERE guest_id = $1")
        .bind(guest_id.as_uuid())
        .execute(&mut **tx)
        .await?;

    let result = sqlx::query("DELETE FROM guests WHERE id = $1 AND tenant_id = $2")
        .bind(guest_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TxOpError::NotFound("Guest"));
    }
    Ok(())
}

async fn set_rsvp_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    guest_id: EntityId,
    status: RsvpStatus,
) -> Result<GuestRecord, TxOpError> {
    let row = sqlx::query(
        r#"
        UPDATE guests SET rsvp_status = $3, updated_at = NOW()
        WHERE id = $1 AND tenant_id = $2
        RETURNING id, client_id, first_name, last_name, email, phone, rsvp_status,
                  dietary_notes,
                  (SELECT label FROM seating_assignments s WHERE s.guest_id = guests.id)
                      AS seat_assignment
        "#,
    )
    .bind(guest_id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(rsvp_to_str(status))
    .fetch_optional(&mut **tx)
    .await?;

    row.map(|row| row_to_guest(&row))
        .ok_or(TxOpError::NotFound("Guest"))
}

async fn insert_timeline_item_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    item: NewTimelineItem,
) -> Result<TimelineItemRecord, TxOpError> {
    let id = EntityId::new();
    sqlx::query(
        r#"
        INSERT INTO timeline_items (id, tenant_id, client_id, title, starts_at, ends_at, location, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(item.client_id.as_uuid())
    .bind(&item.title)
    .bind(item.starts_at.as_datetime())
    .bind(item.ends_at.map(|t| *t.as_datetime()))
    .bind(&item.location)
    .execute(&mut **tx)
    .await?;

    Ok(TimelineItemRecord {
        id,
        client_id: item.client_id,
        title: item.title,
        starts_at: item.starts_at,
        ends_at: item.ends_at,
        location: item.location,
    })
}

async fn remove_timeline_item_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    item_id: EntityId,
) -> Result<(), TxOpError> {
    let result = sqlx::query("DELETE FROM timeline_items WHERE id = $1 AND tenant_id = $2")
        .bind(item_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TxOpError::NotFound("Timeline item"));
    }
    Ok(())
}

async fn shift_timeline_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    client_id: EntityId,
    minutes: i64,
) -> Result<u64, TxOpError> {
    let result = sqlx::query(
        r#"
        UPDATE timeline_items SET
            starts_at = starts_at + make_interval(mins => $3::int),
            ends_at = ends_at + make_interval(mins => $3::int),
            updated_at = NOW()
        WHERE client_id = $1 AND tenant_id = $2
        "#,
    )
    .bind(client_id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(minutes)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_budget_item_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    item: NewBudgetItem,
) -> Result<BudgetItemRecord, TxOpError> {
    let id = EntityId::new();
    sqlx::query(
        r#"
        INSERT INTO budget_items (id, tenant_id, client_id, name, amount, paid, category, vendor_name, created_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, NOW())
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(item.client_id.as_uuid())
    .bind(&item.name)
    .bind(item.amount)
    .bind(&item.category)
    .bind(&item.vendor_name)
    .execute(&mut **tx)
    .await?;

    Ok(BudgetItemRecord {
        id,
        client_id: item.client_id,
        name: item.name,
        amount: item.amount,
        paid: false,
        category: item.category,
        vendor_name: item.vendor_name,
    })
}

async fn update_budget_item_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    item_id: EntityId,
    patch: BudgetItemPatch,
) -> Result<BudgetItemRecord, TxOpError> {
    let row = sqlx::query(
        r#"
        UPDATE budget_items SET
            amount = COALESCE($3, amount),
            paid = COALESCE($4, paid),
            category = COALESCE($5, category),
            updated_at = NOW()
        WHERE id = $1 AND tenant_id = $2
        RETURNING id, client_id, name, amount, paid, category, vendor_name
        "#,
    )
    .bind(item_id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(patch.amount)
    .bind(patch.paid)
    .bind(&patch.category)
    .fetch_optional(&mut **tx)
    .await?;

    let row = row.ok_or(TxOpError::NotFound("Budget item"))?;
    Ok(BudgetItemRecord {
        id: EntityId::from_uuid(row.get("id")),
        client_id: EntityId::from_uuid(row.get("client_id")),
        name: row.get("name"),
        amount: row.get("amount"),
        paid: row.get("paid"),
        category: row.get("category"),
        vendor_name: row.get("vendor_name"),
    })
}

async fn insert_vendor_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    vendor: NewVendor,
) -> Result<VendorRecord, TxOpError> {
    let id = EntityId::new();
    sqlx::query(
        r#"
        INSERT INTO vendors (id, tenant_id, client_id, name, service, email, phone, cost, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        "#,
    )
    .bind(id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(vendor.client_id.as_uuid())
    .bind(&vendor.name)
    .bind(&vendor.service)
    .bind(&vendor.email)
    .bind(&vendor.phone)
    .bind(vendor.cost)
    .execute(&mut **tx)
    .await?;

    Ok(VendorRecord {
        id,
        client_id: vendor.client_id,
        name: vendor.name,
        service: vendor.service,
        email: vendor.email,
        phone: vendor.phone,
        cost: vendor.cost,
    })
}

async fn update_vendor_tx(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: TenantId,
    vendor_id: EntityId,
    patch: VendorPatch,
) -> Result<VendorRecord, TxOpError> {
    let row = sqlx::query(
        r#"
        UPDATE vendors SET
            service = COALESCE($3, service),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            cost = COALESCE($6, cost),
            updated_at = NOW()
        WHERE id = $1 AND tenant_id = $2
        RETURNING id, client_id, name, service, email, phone, cost
        "#,
    )
    .bind(vendor_id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(&patch.service)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(patch.cost)
    .fetch_optional(&mut **tx)
    .await?;

    let row = row.ok_or(TxOpError::NotFound("Vendor"))?;
    Ok(VendorRecord {
        id: EntityId::from_uuid(row.get("id")),
        client_id: EntityId::from_uuid(row.get("client_id")),
        name: row.get("name"),
        service: row.get("service"),
        email: row.get("email"),
        phone: row.get("phone"),
        cost: row.get("cost"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsvp_status_roundtrips_through_column_values() {
        for status in [RsvpStatus::Pending, RsvpStatus::Accepted, RsvpStatus::Declined] {
            assert_eq!(rsvp_from_str(rsvp_to_str(status)), status);
        }
    }

    #[test]
    fn unknown_rsvp_column_value_defaults_to_pending() {
        assert_eq!(rsvp_from_str("unknown"), RsvpStatus::Pending);
    }
}
