//! HTTP surface for the execute/confirm/cancel and replay boundaries.

mod dto;
mod handlers;
mod routes;

pub use dto::{ConfirmRequest, ErrorResponse, ExecuteRequest, PendingCallRecord, ProposeResponse};
pub use handlers::AssistantAppState;
pub use routes::assistant_routes;
