use utoipa::OpenApi;

/// Aggregated OpenAPI specification for Tic-Tac-Toe Back.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::stats::get_stats,
        crate::routes::game::get_game,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::stats::StatsResponse,
            crate::dto::game::GameSummary,
            crate::dto::game::GameStatus,
            crate::dto::ws::ClientInboundMessage,
            crate::dto::ws::ServerOutboundMessage,
            crate::state::board::Mark,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "stats", description = "Server-wide game statistics"),
        (name = "game", description = "Read-only game lookup"),
        (name = "players", description = "WebSocket operations for players"),
    )
)]
pub struct ApiDoc;
