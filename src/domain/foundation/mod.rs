//! Foundation value objects shared across the domain.

mod context;
mod errors;
mod ids;
mod timestamp;

pub use context::{CallerContext, RequestIdentity};
pub use errors::{EntityCandidate, ToolError};
pub use ids::{EntityId, PendingCallId, SyncActionId, TenantId, UserId};
pub use timestamp::Timestamp;
