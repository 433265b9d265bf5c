use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::{game::GameSummary, validation::validate_game_id},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Read-only routes exposing live games.
pub fn router() -> Router<SharedState> {
    Router::new().route("/games/{id}", get(get_game))
}

/// Look up a live game by identifier.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Current game state", body = GameSummary),
        (status = 400, description = "Malformed game identifier"),
        (status = 404, description = "No live game with this identifier")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameSummary>, AppError> {
    validate_game_id(&id, state.config().max_game_id_len())
        .map_err(|err| AppError::BadRequest(err.to_string()))?;
    let summary = game_service::game_summary(&state, &id).await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn malformed_id_is_a_bad_request() {
        let state = AppState::new(AppConfig::default());
        for id in ["", "   ", "line\nbreak"] {
            let response = get_game(State(state.clone()), Path(id.to_owned()))
                .await
                .unwrap_err()
                .into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{id:?}");
        }
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let state = AppState::new(AppConfig::default());
        let response = get_game(State(state), Path("missing".to_owned()))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn live_game_is_summarised() {
        let state = AppState::new(AppConfig::default());
        state.registry().create("live").unwrap();

        let Json(summary) = get_game(State(state), Path("live".to_owned()))
            .await
            .unwrap();
        assert_eq!(summary.id, "live");
        assert_eq!(summary.board, "---\n---\n---\n");
        assert_eq!(summary.players, 0);
    }
}
