//! Axum router configuration for the assistant endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_tool, confirm_tool, execute_tool, list_pending, preview_tool, replay_sync,
    AssistantAppState,
};

/// Create the assistant API router.
///
/// # Routes
///
/// ## Tool pipeline
/// - `POST /assistant/preview` - Preview a proposed call
/// - `POST /assistant/execute` - Propose a call (executes or parks it)
/// - `POST /assistant/confirm` - Confirm a parked call
/// - `POST /assistant/cancel` - Cancel a parked call
/// - `GET /assistant/pending` - List the caller's parked calls
///
/// ## Cache invalidation
/// - `GET /sync/replay` - Replay sync actions since a timestamp
pub fn assistant_routes() -> Router<AssistantAppState> {
    Router::new()
        .route("/assistant/preview", post(preview_tool))
        .route("/assistant/execute", post(execute_tool))
        .route("/assistant/confirm", post(confirm_tool))
        .route("/assistant/cancel", post(cancel_tool))
        .route("/assistant/pending", get(list_pending))
        .route("/sync/replay", get(replay_sync))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_defined() {
        // Verifies the router can be constructed; behavior is covered
        // by the integration tests against in-memory adapters.
        let _router = assistant_routes();
    }
}
