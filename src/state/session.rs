use std::hash::Hash;

use indexmap::IndexSet;
use tokio::sync::Mutex;

use crate::{
    error::GameError,
    state::{
        board::{Mark, Outcome},
        match_state::MatchState,
    },
};

/// A single match: its board plus the connections attached to it.
///
/// Connections are opaque handles `C`; the session only compares and hashes
/// them. Every operation runs under one session-wide lock, so sessions never
/// contend with each other and never touch the registry while locked.
#[derive(Debug)]
pub struct MatchSession<C> {
    inner: Mutex<SessionInner<C>>,
}

#[derive(Debug)]
struct SessionInner<C> {
    state: MatchState,
    participants: IndexSet<C>,
    player_x: Option<C>,
    player_o: Option<C>,
    /// Set once the last participant left; the session is on its way out of the registry.
    retired: bool,
}

/// Result of an accepted move, captured inside the critical section.
#[derive(Debug, Clone)]
pub struct MoveReport<C> {
    /// Side that played.
    pub mark: Mark,
    /// Result after the move.
    pub outcome: Outcome,
    /// Board text after the move.
    pub board: String,
    /// Everyone to notify about the new board.
    pub participants: Vec<C>,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Rendered board text.
    pub board: String,
    /// Mark to move next.
    pub turn: Mark,
    /// Result so far.
    pub outcome: Outcome,
    /// Bound sides, 0 to 2.
    pub players: usize,
    /// Attached connections.
    pub participants: usize,
}

impl<C> Default for MatchSession<C>
where
    C: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MatchSession<C>
where
    C: Clone + Eq + Hash,
{
    /// New session with a fresh game and nobody attached.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: MatchState::new(),
                participants: IndexSet::new(),
                player_x: None,
                player_o: None,
                retired: false,
            }),
        }
    }

    /// Attach `connection` and bind it to the first free side.
    ///
    /// A connection that already holds a side gets that side back. Sides are
    /// handed out first come, first served.
    pub async fn assign_side(&self, connection: C) -> Result<Mark, GameError> {
        let mut inner = self.inner.lock().await;
        if inner.retired {
            return Err(GameError::SessionNotFound);
        }
        if let Some(mark) = inner.side_of(&connection) {
            return Ok(mark);
        }

        let mark = if inner.player_x.is_none() {
            inner.player_x = Some(connection.clone());
            Mark::X
        } else if inner.player_o.is_none() {
            inner.player_o = Some(connection.clone());
            Mark::O
        } else {
            return Err(GameError::SessionFull);
        };
        inner.participants.insert(connection);
        Ok(mark)
    }

    /// Detach `connection`, releasing its side.
    ///
    /// Returns `true` when this departure left the session empty. Only one
    /// caller ever sees `true`, and it owns removing the session from the
    /// registry.
    pub async fn remove_participant(&self, connection: &C) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.player_x.as_ref() == Some(connection) {
            inner.player_x = None;
        }
        if inner.player_o.as_ref() == Some(connection) {
            inner.player_o = None;
        }
        if !inner.participants.shift_remove(connection) {
            return false;
        }

        let empty = inner.participants.is_empty();
        if empty {
            inner.retired = true;
        }
        empty
    }

    /// Side held by `connection` in this session.
    pub async fn side_of(&self, connection: &C) -> Result<Mark, GameError> {
        self.inner
            .lock()
            .await
            .side_of(connection)
            .ok_or(GameError::NotAParticipant)
    }

    /// Play a move on behalf of `connection`.
    ///
    /// The turn is checked here against the connection's side before the
    /// board re-checks it, so callers get [`GameError::NotYourTurn`] rather
    /// than a board-level failure.
    pub async fn make_move(
        &self,
        connection: &C,
        row: i64,
        col: i64,
    ) -> Result<MoveReport<C>, GameError> {
        let mut inner = self.inner.lock().await;
        let mark = inner
            .side_of(connection)
            .ok_or(GameError::NotAParticipant)?;
        if inner.state.outcome().is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        if inner.state.turn() != mark {
            return Err(GameError::NotYourTurn);
        }

        let outcome = inner.state.apply_move(row, col, mark)?;
        Ok(MoveReport {
            mark,
            outcome,
            board: inner.state.render(),
            participants: inner.participants.iter().cloned().collect(),
        })
    }

    /// Connections currently attached, in join order.
    pub async fn participants(&self) -> Vec<C> {
        self.inner
            .lock()
            .await
            .participants
            .iter()
            .cloned()
            .collect()
    }

    /// Read board, turn, outcome and occupancy in one critical section.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            board: inner.state.render(),
            turn: inner.state.turn(),
            outcome: inner.state.outcome(),
            players: [&inner.player_x, &inner.player_o]
                .iter()
                .filter(|slot| slot.is_some())
                .count(),
            participants: inner.participants.len(),
        }
    }
}

impl<C: PartialEq> SessionInner<C> {
    fn side_of(&self, connection: &C) -> Option<Mark> {
        if self.player_x.as_ref() == Some(connection) {
            Some(Mark::X)
        } else if self.player_o.as_ref() == Some(connection) {
            Some(Mark::O)
        } else {
            None
        }
    }
}
