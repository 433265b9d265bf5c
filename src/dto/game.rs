use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    board::{Mark, Outcome},
    session::SessionSnapshot,
};

/// Lifecycle of a game as exposed over HTTP.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Tied,
}

/// Public view of a single game session.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: String,
    /// Board text: three lines of three characters, `-` for empty cells.
    pub board: String,
    pub status: GameStatus,
    /// Mark expected to play next; absent once the game is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<Mark>,
    /// Winning mark, present only when `status` is `won`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Mark>,
    /// Number of bound sides (0 to 2).
    pub players: usize,
    /// Connections attached to the game.
    pub connections: usize,
}

impl GameSummary {
    pub fn new(id: String, snapshot: SessionSnapshot) -> Self {
        let (status, turn, winner) = match snapshot.outcome {
            Outcome::InProgress => (GameStatus::InProgress, Some(snapshot.turn), None),
            Outcome::Won(mark) => (GameStatus::Won, None, Some(mark)),
            Outcome::Tied => (GameStatus::Tied, None, None),
        };
        Self {
            id,
            board: snapshot.board,
            status,
            turn,
            winner,
            players: snapshot.players,
            connections: snapshot.participants,
        }
    }
}
