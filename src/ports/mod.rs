//! Ports: interfaces the application core depends on.
//!
//! Adapters implement these traits; the dispatcher and services only
//! see the trait objects.

mod pending_call_store;
mod planning_reader;
mod planning_store;
mod sync_broadcaster;
mod sync_log;

pub use pending_call_store::{PendingCallStore, PendingCallStoreError};
pub use planning_reader::PlanningReader;
pub use planning_store::{
    BudgetItemPatch, ClientCascade, GuestPatch, NewBudgetItem, NewClient, NewGuest,
    NewTimelineItem, NewVendor, PlanningStore, StoreError, VendorPatch,
};
pub use sync_broadcaster::{BroadcastError, SyncBroadcaster};
pub use sync_log::{SyncLog, SyncLogError};
