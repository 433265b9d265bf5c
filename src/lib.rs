//! Library crate for tic-tac-toe-back, exposing modules for binaries and tests.

/// Configuration file and environment loading.
pub mod config;
mod dto;
mod error;
/// HTTP and WebSocket route trees.
pub mod routes;
/// Game, stats, health and documentation services behind the routes.
pub mod services;
/// Shared application state: game sessions, registry and counters.
pub mod state;
