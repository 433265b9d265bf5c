use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload, logging the live session count.
pub fn health_status(state: &SharedState) -> HealthResponse {
    debug!(active_games = state.registry().len(), "health check");
    HealthResponse::ok()
}
