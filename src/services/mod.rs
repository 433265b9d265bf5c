/// OpenAPI documentation generation.
pub mod documentation;
/// Game dispatch for player connections: create, join, move, leave.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Server-wide statistics.
pub mod stats_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
