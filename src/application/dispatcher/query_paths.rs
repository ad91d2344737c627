//! Static table mapping tools to the cached query paths they invalidate.
//!
//! Initialized once at process start and only ever read through
//! [`sync_entry`]. Query tools have no entry: they invalidate nothing.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::tools::{SyncActionType, ToolName};

/// How one tool's committed mutation maps onto a sync action.
#[derive(Debug, Clone, Copy)]
pub struct SyncTableEntry {
    /// Which module's data changed.
    pub module: &'static str,
    /// The kind of change.
    pub action_type: SyncActionType,
    /// Cached query identifiers made stale by the change.
    pub query_paths: &'static [&'static str],
}

static SYNC_TABLE: Lazy<HashMap<ToolName, SyncTableEntry>> = Lazy::new(|| {
    use SyncActionType::*;
    use ToolName::*;

    let mut table = HashMap::new();
    table.insert(
        CreateClient,
        SyncTableEntry {
            module: "clients",
            action_type: Insert,
            query_paths: &["clients.list", "events.list", "budget.summary"],
        },
    );
    table.insert(
        AddGuest,
        SyncTableEntry {
            module: "guests",
            action_type: Insert,
            query_paths: &["guests.list", "guests.count"],
        },
    );
    table.insert(
        UpdateGuest,
        SyncTableEntry {
            module: "guests",
            action_type: Update,
            query_paths: &["guests.list"],
        },
    );
    table.insert(
        RemoveGuest,
        SyncTableEntry {
            module: "guests",
            action_type: Delete,
            query_paths: &["guests.list", "guests.count", "seating.chart"],
        },
    );
    table.insert(
        UpdateRsvp,
        SyncTableEntry {
            module: "guests",
            action_type: Update,
            query_paths: &["guests.list", "guests.count", "seating.chart"],
        },
    );
    table.insert(
        AddTimelineItem,
        SyncTableEntry {
            module: "timeline",
            action_type: Insert,
            query_paths: &["timeline.list"],
        },
    );
    table.insert(
        ShiftTimeline,
        SyncTableEntry {
            module: "timeline",
            action_type: Update,
            query_paths: &["timeline.list"],
        },
    );
    table.insert(
        RemoveTimelineItem,
        SyncTableEntry {
            module: "timeline",
            action_type: Delete,
            query_paths: &["timeline.list"],
        },
    );
    table.insert(
        AddBudgetItem,
        SyncTableEntry {
            module: "budget",
            action_type: Insert,
            query_paths: &["budget.list", "budget.summary"],
        },
    );
    table.insert(
        UpdateBudgetItem,
        SyncTableEntry {
            module: "budget",
            action_type: Update,
            query_paths: &["budget.list", "budget.summary"],
        },
    );
    table.insert(
        AddVendor,
        SyncTableEntry {
            module: "vendors",
            action_type: Insert,
            query_paths: &["vendors.list", "budget.summary"],
        },
    );
    table.insert(
        UpdateVendor,
        SyncTableEntry {
            module: "vendors",
            action_type: Update,
            query_paths: &["vendors.list", "budget.summary"],
        },
    );
    table
});

/// Looks up the sync mapping for a tool. `None` for tools that
/// invalidate nothing (queries).
pub fn sync_entry(tool: ToolName) -> Option<&'static SyncTableEntry> {
    SYNC_TABLE.get(&tool)
}
