//! Server-wide game counters.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::SystemTime,
};

use crate::state::board::{Mark, Outcome};

/// Server-wide counters exposed through `/stats`.
#[derive(Debug)]
pub struct GameStats {
    started_at: SystemTime,
    games_created: AtomicU64,
    games_finished: AtomicU64,
    x_wins: AtomicU64,
    o_wins: AtomicU64,
    ties: AtomicU64,
    moves_played: AtomicU64,
}

/// Point-in-time copy of [`GameStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// When the server started.
    pub started_at: SystemTime,
    /// Games registered since start, including ones already removed.
    pub games_created: u64,
    /// Games that reached a win or a tie.
    pub games_finished: u64,
    /// Games won by `X`.
    pub x_wins: u64,
    /// Games won by `O`.
    pub o_wins: u64,
    /// Games ending in a tie.
    pub ties: u64,
    /// Accepted moves across all games.
    pub moves_played: u64,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Zeroed counters starting now.
    pub fn new() -> Self {
        Self {
            started_at: SystemTime::now(),
            games_created: AtomicU64::new(0),
            games_finished: AtomicU64::new(0),
            x_wins: AtomicU64::new(0),
            o_wins: AtomicU64::new(0),
            ties: AtomicU64::new(0),
            moves_played: AtomicU64::new(0),
        }
    }

    /// Count a game whose creator got seated.
    pub fn record_game_created(&self) {
        self.games_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an accepted move and, when it ended the game, its result.
    pub fn record_move(&self, outcome: Outcome) {
        self.moves_played.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::InProgress => return,
            Outcome::Won(Mark::X) => &self.x_wins,
            Outcome::Won(Mark::O) => &self.o_wins,
            Outcome::Tied => &self.ties,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.games_finished.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            games_created: self.games_created.load(Ordering::Relaxed),
            games_finished: self.games_finished.load(Ordering::Relaxed),
            x_wins: self.x_wins.load(Ordering::Relaxed),
            o_wins: self.o_wins.load(Ordering::Relaxed),
            ties: self.ties.load(Ordering::Relaxed),
            moves_played: self.moves_played.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_games_are_split_by_result() {
        let stats = GameStats::new();
        stats.record_game_created();
        stats.record_move(Outcome::InProgress);
        stats.record_move(Outcome::Won(Mark::O));
        stats.record_move(Outcome::Tied);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.games_created, 1);
        assert_eq!(snapshot.moves_played, 3);
        assert_eq!(snapshot.games_finished, 2);
        assert_eq!((snapshot.x_wins, snapshot.o_wins, snapshot.ties), (0, 1, 1));
    }
}
