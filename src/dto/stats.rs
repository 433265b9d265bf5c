use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::format_system_time, state::stats::StatsSnapshot};

/// Aggregated server counters returned by `GET /stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Sessions currently registered.
    pub active_games: usize,
    pub games_created: u64,
    pub games_finished: u64,
    pub x_wins: u64,
    pub o_wins: u64,
    pub ties: u64,
    /// Accepted moves across all games.
    pub moves_played: u64,
    /// RFC 3339 timestamp of server start.
    pub started_at: String,
}

impl StatsResponse {
    pub fn new(active_games: usize, snapshot: StatsSnapshot) -> Self {
        Self {
            active_games,
            games_created: snapshot.games_created,
            games_finished: snapshot.games_finished,
            x_wins: snapshot.x_wins,
            o_wins: snapshot.o_wins,
            ties: snapshot.ties,
            moves_played: snapshot.moves_played,
            started_at: format_system_time(snapshot.started_at),
        }
    }
}
