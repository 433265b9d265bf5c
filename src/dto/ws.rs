use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::{dto::validation::validate_game_id, error::ProtocolError, state::board::Mark};

#[derive(Debug, Deserialize, ToSchema, PartialEq, Eq)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type")]
pub enum ClientInboundMessage {
    /// Register a new game under `gameID` and take a side in it.
    #[serde(rename = "create")]
    Create {
        #[serde(rename = "gameID", default)]
        game_id: String,
    },
    /// Take a side in an existing game.
    #[serde(rename = "join")]
    Join {
        #[serde(rename = "gameID", default)]
        game_id: String,
    },
    /// Place the connection's mark at a zero-based board position.
    #[serde(rename = "move")]
    Move { row: i64, col: i64 },
    #[serde(other)]
    Unknown,
}

impl ClientInboundMessage {
    /// Parse a text frame and validate the game identifier it carries.
    pub fn from_json_str(text: &str, max_game_id_len: u64) -> Result<Self, ProtocolError> {
        let message: Self = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
        if let Self::Create { game_id } | Self::Join { game_id } = &message {
            let mut errors = ValidationErrors::new();
            if let Err(e) = validate_game_id(game_id, max_game_id_len) {
                errors.add("gameID", e);
            }
            if !errors.is_empty() {
                return Err(errors.into());
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Status, board or error message pushed to player clients.
pub struct ServerOutboundMessage {
    /// Human readable label (`error`, `Board updated`, `Winner`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "gameID", default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    /// Game id, rendered board, mark, winner or error text depending on `type`.
    pub payload: String,
}

impl ServerOutboundMessage {
    pub const ERROR: &'static str = "error";
    pub const GAME_CREATED: &'static str = "Game created";
    pub const GAME_JOINED: &'static str = "Game joined";
    pub const ASSIGNED: &'static str = "Assigned";
    pub const BOARD_UPDATED: &'static str = "Board updated";
    pub const WINNER: &'static str = "Winner";
    pub const PLAYER_JOINED: &'static str = "Player joined";
    pub const PLAYER_LEFT: &'static str = "Player left";

    fn new(kind: &str, game_id: Option<&str>, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            game_id: game_id.map(str::to_owned),
            payload: payload.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Self::ERROR, None, message)
    }

    pub fn game_created(game_id: &str) -> Self {
        Self::new(Self::GAME_CREATED, Some(game_id), game_id)
    }

    pub fn game_joined(game_id: &str) -> Self {
        Self::new(Self::GAME_JOINED, Some(game_id), game_id)
    }

    /// Tells a connection which mark it plays.
    pub fn assigned(game_id: &str, mark: Mark) -> Self {
        Self::new(Self::ASSIGNED, Some(game_id), mark.to_string())
    }

    pub fn board_updated(game_id: &str, board: impl Into<String>) -> Self {
        Self::new(Self::BOARD_UPDATED, Some(game_id), board)
    }

    /// Final result: `X`, `O` or `tie`.
    pub fn winner(game_id: &str, label: impl Into<String>) -> Self {
        Self::new(Self::WINNER, Some(game_id), label)
    }

    pub fn player_joined(game_id: &str, mark: Mark) -> Self {
        Self::new(Self::PLAYER_JOINED, Some(game_id), mark.to_string())
    }

    pub fn player_left(game_id: &str, mark: Mark) -> Self {
        Self::new(Self::PLAYER_LEFT, Some(game_id), mark.to_string())
    }
}
