//! Tool dispatch, preview generation, confirmation, and change sync.

mod confirmation;
mod execute;
mod format;
mod preview;
mod query_paths;
mod sync;
mod warnings;

pub use confirmation::{ConfirmationService, ProposalOutcome};
pub use execute::ToolDispatcher;
pub use format::{display_value, format_currency, is_money_field, render_description};
pub use preview::PreviewGenerator;
pub use query_paths::{sync_entry, SyncTableEntry};
pub use sync::{ExecutionPipeline, SyncService};
