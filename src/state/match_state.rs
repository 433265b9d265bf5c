use crate::{
    error::GameError,
    state::board::{self, BOARD_SIZE, Grid, Mark, Outcome},
};

/// Board, turn and outcome of a single game.
///
/// The only mutation path is [`MatchState::apply_move`], which either fully
/// applies a move or leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    grid: Grid,
    turn: Mark,
    outcome: Outcome,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Fresh game with an empty board and `X` to move.
    pub fn new() -> Self {
        Self {
            grid: [[None; BOARD_SIZE]; BOARD_SIZE],
            turn: Mark::X,
            outcome: Outcome::InProgress,
        }
    }

    /// Cells, row-major.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mark allowed to move next. Only meaningful while the game is in progress.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Result so far.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Text rendering of the board sent to clients.
    pub fn render(&self) -> String {
        board::render(&self.grid)
    }

    /// Number of marks placed so far.
    pub fn moves_played(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Place `acting_mark` at (`row`, `col`) and advance the game.
    ///
    /// Coordinates are signed so out-of-range client input, negative values
    /// included, is reported as [`GameError::OutOfBounds`].
    pub fn apply_move(
        &mut self,
        row: i64,
        col: i64,
        acting_mark: Mark,
    ) -> Result<Outcome, GameError> {
        if self.outcome.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        let (row, col) = match (cell_index(row), cell_index(col)) {
            (Some(row), Some(col)) => (row, col),
            _ => return Err(GameError::OutOfBounds),
        };
        if acting_mark != self.turn {
            return Err(GameError::NotYourTurn);
        }
        if self.grid[row][col].is_some() {
            return Err(GameError::CellOccupied);
        }

        self.grid[row][col] = Some(acting_mark);
        self.outcome = board::evaluate(&self.grid, acting_mark);
        if !self.outcome.is_terminal() {
            self.turn = acting_mark.other();
        }
        Ok(self.outcome)
    }
}

fn cell_index(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|&index| index < BOARD_SIZE)
}
