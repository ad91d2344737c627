//! Tool-call value objects and entities.
//!
//! Everything the execution pipeline passes around: the call itself,
//! its typed arguments, the rendered preview, the pending-confirmation
//! entity, the execution result, and the sync action broadcast after a
//! committed mutation.

mod args;
mod pending_call;
mod preview;
mod sync_action;
mod tool_call;
mod tool_name;

pub use args::{
    AddBudgetItemArgs, AddGuestArgs, AddTimelineItemArgs, AddVendorArgs, CreateClientArgs,
    GetBudgetSummaryArgs, GetTimelineArgs, ListGuestsArgs, RemoveGuestArgs,
    RemoveTimelineItemArgs, RsvpStatus, ShiftTimelineArgs, ToolArgs, UpdateBudgetItemArgs,
    UpdateGuestArgs, UpdateRsvpArgs, UpdateVendorArgs,
};
pub use pending_call::{PendingToolCall, DEFAULT_TTL_SECS};
pub use preview::{PreviewField, ToolPreview};
pub use sync_action::{SyncAction, SyncActionType};
pub use tool_call::{CascadeResult, ToolCall, ToolExecutionResult};
pub use tool_name::{registry, ToolKind, ToolMetadata, ToolName, ToolRegistry};
