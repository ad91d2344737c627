//! Planning Reader Port - read-side queries for previews and resolution.
//!
//! The preview generator uses this port for warning checks (budget
//! overrun, duplicates, seating impact) and the dispatcher uses it to
//! resolve free-text entity references against the tenant's data.

use async_trait::async_trait;

use crate::domain::foundation::{EntityId, TenantId};
use crate::domain::planning::{
    BudgetItemRecord, BudgetSummary, ClientRef, GuestRecord, TimelineItemRecord, VendorRecord,
};
use crate::domain::tools::RsvpStatus;

use super::StoreError;

/// Port for read-side planning queries.
#[async_trait]
pub trait PlanningReader: Send + Sync {
    /// Resolves a caller-supplied client reference (id or name) within a
    /// tenant. Returns `None` when nothing matches; ambiguity is not
    /// possible because client names are unique per tenant.
    async fn resolve_client(
        &self,
        tenant_id: TenantId,
        reference: &str,
    ) -> Result<Option<ClientRef>, StoreError>;

    /// Finds guests whose name matches a free-text query
    /// (case-insensitive, full or first name). Used for entity
    /// resolution; more than one result surfaces as ambiguity upstream.
    async fn guests_matching(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        query: &str,
    ) -> Result<Vec<GuestRecord>, StoreError>;

    /// Finds guests that look like duplicates of the given identity:
    /// normalized-name equality, or an exact email/phone match.
    async fn find_guest_duplicates(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<GuestRecord>, StoreError>;

    /// Lists a client's guests, optionally filtered by RSVP status.
    async fn guests(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        rsvp_status: Option<RsvpStatus>,
    ) -> Result<Vec<GuestRecord>, StoreError>;

    /// Lists a client's timeline, ordered by start time.
    async fn timeline_items(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<Vec<TimelineItemRecord>, StoreError>;

    /// Finds timeline items by exact title (case-insensitive).
    async fn timeline_items_titled(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        title: &str,
    ) -> Result<Vec<TimelineItemRecord>, StoreError>;

    /// Lists a client's budget items.
    async fn budget_items(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<Vec<BudgetItemRecord>, StoreError>;

    /// Finds budget items by name (case-insensitive).
    async fn budget_items_named(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        name: &str,
    ) -> Result<Vec<BudgetItemRecord>, StoreError>;

    /// Aggregated budget totals for a client.
    async fn budget_summary(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<BudgetSummary, StoreError>;

    /// Finds vendors whose name matches a free-text query.
    async fn vendors_matching(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        query: &str,
    ) -> Result<Vec<VendorRecord>, StoreError>;

    /// Finds vendors that look like duplicates of the given identity.
    async fn find_vendor_duplicates(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<VendorRecord>, StoreError>;
}
