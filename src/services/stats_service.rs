use crate::{dto::stats::StatsResponse, state::SharedState};

/// Collect the live session count and the server-wide counters.
pub fn current_stats(state: &SharedState) -> StatsResponse {
    StatsResponse::new(state.registry().len(), state.stats().snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[test]
    fn counts_live_sessions() {
        let state = AppState::new(AppConfig::default());
        state.registry().create("a").unwrap();
        state.registry().create("b").unwrap();
        state.stats().record_game_created();

        let stats = current_stats(&state);
        assert_eq!(stats.active_games, 2);
        assert_eq!(stats.games_created, 1);
        assert!(!stats.started_at.is_empty());
    }
}
