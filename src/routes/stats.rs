use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::stats::StatsResponse, services::stats_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses((status = 200, description = "Server-wide game counters", body = StatsResponse))
)]
/// Report live sessions and finished game counters.
pub async fn get_stats(State(state): State<SharedState>) -> Json<StatsResponse> {
    Json(stats_service::current_stats(&state))
}

/// Configure the statistics routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/stats", get(get_stats))
}
