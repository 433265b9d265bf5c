use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Failures raised by the match core (board, sessions and registry).
///
/// Every variant is recoverable: the operation that produced it left the
/// shared state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Row or column outside of the 3x3 board.
    #[error("move out of bounds")]
    OutOfBounds,
    /// Target cell already holds a mark.
    #[error("cell already occupied")]
    CellOccupied,
    /// The game has been won or tied.
    #[error("game is already over")]
    GameAlreadyOver,
    /// The acting side is not the side whose turn it is.
    #[error("not your turn")]
    NotYourTurn,
    /// `create` was called with an identifier already in use.
    #[error("game ID already exists")]
    SessionAlreadyExists,
    /// No session is registered under the identifier.
    #[error("game not found")]
    SessionNotFound,
    /// Both sides are already bound.
    #[error("game is already full")]
    SessionFull,
    /// The connection holds no side in this session.
    #[error("connection is not a player in this game")]
    NotAParticipant,
}

/// Errors caused by a client message that could not be dispatched.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame was not valid JSON or missed required fields.
    #[error("invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),
    /// Message carried an unrecognised `type`.
    #[error("unknown message type")]
    UnknownType,
    /// Message fields failed validation.
    #[error("invalid message: {0}")]
    Invalid(String),
    /// A move was sent before creating or joining a game.
    #[error("no game joined")]
    NoGameJoined,
    /// The match core rejected the request.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl From<ValidationErrors> for ProtocolError {
    fn from(err: ValidationErrors) -> Self {
        ProtocolError::Invalid(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::SessionNotFound => AppError::NotFound(err.to_string()),
            GameError::SessionAlreadyExists
            | GameError::SessionFull
            | GameError::GameAlreadyOver
            | GameError::NotYourTurn
            | GameError::CellOccupied => AppError::Conflict(err.to_string()),
            GameError::OutOfBounds | GameError::NotAParticipant => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_http_statuses() {
        let cases = [
            (GameError::SessionNotFound, StatusCode::NOT_FOUND),
            (GameError::SessionFull, StatusCode::CONFLICT),
            (GameError::OutOfBounds, StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status, "{err:?}");
        }
    }

    #[test]
    fn protocol_error_forwards_game_message() {
        let err = ProtocolError::from(GameError::CellOccupied);
        assert_eq!(err.to_string(), "cell already occupied");
    }
}
