//! Planning Store Port - transactional mutations on planning data.
//!
//! Each method is one atomic unit of work: the adapter wraps it in a
//! transaction with retry-on-conflict, so a caller never observes a
//! partial cascade. Methods that touch more than one logical record
//! (e.g. [`PlanningStore::create_client_with_defaults`]) perform the
//! primary write and its cascade writes inside that single transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{EntityId, TenantId, Timestamp};
use crate::domain::planning::{BudgetItemRecord, ClientRef, GuestRecord, TimelineItemRecord, VendorRecord};
use crate::domain::tools::RsvpStatus;

/// A guest to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGuest {
    pub client_id: EntityId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub side: Option<String>,
    pub dietary_notes: Option<String>,
}

/// Fields to change on a guest. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dietary_notes: Option<String>,
}

/// A timeline item to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimelineItem {
    pub client_id: EntityId,
    pub title: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
}

/// A budget item to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudgetItem {
    pub client_id: EntityId,
    pub name: String,
    pub amount: f64,
    pub category: Option<String>,
    pub vendor_name: Option<String>,
}

/// Fields to change on a budget item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetItemPatch {
    pub amount: Option<f64>,
    pub paid: Option<bool>,
    pub category: Option<String>,
}

/// A vendor to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVendor {
    pub client_id: EntityId,
    pub name: String,
    pub service: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cost: Option<f64>,
}

/// Fields to change on a vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorPatch {
    pub service: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cost: Option<f64>,
}

/// A client to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub event_date: Option<Timestamp>,
    pub total_budget: Option<f64>,
}

/// Result of creating a client with its seeded defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCascade {
    /// The created client.
    pub client: ClientRef,
    /// The seeded default event.
    pub event_id: EntityId,
    /// The seeded budget allocation.
    pub budget_allocation_id: EntityId,
}

/// Port for transactional planning mutations.
#[async_trait]
pub trait PlanningStore: Send + Sync {
    /// Creates a client, plus its default event and starting budget
    /// allocation, atomically.
    async fn create_client_with_defaults(
        &self,
        tenant_id: TenantId,
        client: NewClient,
    ) -> Result<ClientCascade, StoreError>;

    /// Inserts a guest.
    async fn insert_guest(
        &self,
        tenant_id: TenantId,
        guest: NewGuest,
    ) -> Result<GuestRecord, StoreError>;

    /// Applies a patch to a guest.
    async fn update_guest(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
        patch: GuestPatch,
    ) -> Result<GuestRecord, StoreError>;

    /// Removes a guest, releasing any seat assignment atomically.
    async fn remove_guest(&self, tenant_id: TenantId, guest_id: EntityId)
        -> Result<(), StoreError>;

    /// Sets a guest's RSVP status.
    async fn set_rsvp(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
        status: RsvpStatus,
    ) -> Result<GuestRecord, StoreError>;

    /// Inserts a timeline item.
    async fn insert_timeline_item(
        &self,
        tenant_id: TenantId,
        item: NewTimelineItem,
    ) -> Result<TimelineItemRecord, StoreError>;

    /// Removes a timeline item.
    async fn remove_timeline_item(
        &self,
        tenant_id: TenantId,
        item_id: EntityId,
    ) -> Result<(), StoreError>;

    /// Shifts every timeline item of a client by the given number of
    /// minutes, atomically. Returns the number of shifted rows.
    async fn shift_timeline(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        minutes: i64,
    ) -> Result<u64, StoreError>;

    /// Inserts a budget item.
    async fn insert_budget_item(
        &self,
        tenant_id: TenantId,
        item: NewBudgetItem,
    ) -> Result<BudgetItemRecord, StoreError>;

    /// Applies a patch to a budget item.
    async fn update_budget_item(
        &self,
        tenant_id: TenantId,
        item_id: EntityId,
        patch: BudgetItemPatch,
    ) -> Result<BudgetItemRecord, StoreError>;

    /// Inserts a vendor.
    async fn insert_vendor(
        &self,
        tenant_id: TenantId,
        vendor: NewVendor,
    ) -> Result<VendorRecord, StoreError>;

    /// Applies a patch to a vendor.
    async fn update_vendor(
        &self,
        tenant_id: TenantId,
        vendor_id: EntityId,
        patch: VendorPatch,
    ) -> Result<VendorRecord, StoreError>;
}

/// Errors from the planning store and reader.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Database or storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Transaction failed after retries were exhausted, or on a
    /// non-retryable error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Record not found
    #[error("{kind} not found")]
    NotFound { kind: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for crate::domain::foundation::ToolError {
    fn from(err: StoreError) -> Self {
        use crate::domain::foundation::ToolError;
        match err {
            StoreError::Storage(m) => ToolError::internal(m),
            StoreError::TransactionFailed(m) => ToolError::TransactionFailed(m),
            StoreError::NotFound { kind } => ToolError::not_found(kind, "requested record"),
            StoreError::Serialization(m) => ToolError::internal(m),
        }
    }
}

impl StoreError {
    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a transaction-failed error.
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::TransactionFailed(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(kind: impl Into<String>) -> Self {
        Self::NotFound { kind: kind.into() }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}
