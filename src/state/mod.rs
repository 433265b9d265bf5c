pub mod board;
/// Single-game rules: board, turn and outcome.
pub mod match_state;
/// Concurrent id to session map.
pub mod registry;
/// Per-game session guarding state and participants.
pub mod session;
pub mod stats;

use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::AppConfig;

use self::{registry::SessionRegistry, session::MatchSession, stats::GameStats};

/// Handle to [`AppState`] cloned into every handler.
pub type SharedState = Arc<AppState>;
/// Session keyed by live WebSocket connections.
pub type GameSession = MatchSession<PlayerConnection>;
/// Registry holding [`GameSession`]s.
pub type GameRegistry = SessionRegistry<PlayerConnection>;

#[derive(Clone, Debug)]
/// Handle used to push messages to a connected player.
///
/// Identity is the connection id alone; the sender is only a delivery route.
pub struct PlayerConnection {
    /// Connection identity.
    pub id: Uuid,
    /// Writer channel of the connection.
    pub tx: mpsc::UnboundedSender<Message>,
}

impl PlayerConnection {
    /// Allocate a handle with a fresh random identity.
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }
}

impl PartialEq for PlayerConnection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PlayerConnection {}

impl Hash for PlayerConnection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Central application state shared by every connection handler and route.
pub struct AppState {
    config: AppConfig,
    registry: GameRegistry,
    stats: GameStats,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            registry: GameRegistry::new(),
            stats: GameStats::new(),
        })
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of live game sessions keyed by game id.
    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Server-wide counters.
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }
}
