use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// `GET /games/{id}`.
pub mod game;
/// `GET /healthcheck`.
pub mod health;
/// `GET /stats`.
pub mod stats;
/// Player WebSocket upgrade.
pub mod websocket;

/// Compose all route trees and attach the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(stats::router())
        .merge(websocket::router())
        .merge(game::router())
        .merge(docs::router())
        .with_state(state)
}
