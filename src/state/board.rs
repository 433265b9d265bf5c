//! Pure tic-tac-toe board evaluation and rendering.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 3;

/// A 3x3 row-major grid; `None` marks an empty cell.
pub type Grid = [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE];

/// Every line that wins the game when filled with a single mark.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Token placed by a player. `X` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum Mark {
    /// First mover.
    X,
    /// Second mover.
    O,
}

impl Mark {
    /// The mark that moves after this one.
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Character used for this mark in the board text rendering.
    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Result of a game so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No line yet and free cells remain.
    InProgress,
    /// The mark completed a line.
    Won(Mark),
    /// Board full without a line.
    Tied,
}

impl Outcome {
    /// True once the game has ended, whether by a win or a tie.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Text sent to clients once the game is over (`X`, `O` or `tie`).
    pub fn winner_label(self) -> Option<String> {
        match self {
            Outcome::InProgress => None,
            Outcome::Won(mark) => Some(mark.to_string()),
            Outcome::Tied => Some("tie".into()),
        }
    }
}

/// Return whether `mark` fills any row, column or diagonal.
pub fn has_won(grid: &Grid, mark: Mark) -> bool {
    LINES
        .iter()
        .any(|line| line.iter().all(|&(row, col)| grid[row][col] == Some(mark)))
}

/// Return whether every cell of the grid is occupied.
pub fn is_full(grid: &Grid) -> bool {
    grid.iter().flatten().all(Option::is_some)
}

/// Classify the grid right after `just_moved` played.
///
/// Only the mover can have completed a line, so only its mark is checked. A
/// win takes precedence over a full board.
pub fn evaluate(grid: &Grid, just_moved: Mark) -> Outcome {
    if has_won(grid, just_moved) {
        Outcome::Won(just_moved)
    } else if is_full(grid) {
        Outcome::Tied
    } else {
        Outcome::InProgress
    }
}

/// Render the grid as three newline-terminated lines, `-` for empty cells.
pub fn render(grid: &Grid) -> String {
    let mut out = String::with_capacity(BOARD_SIZE * (BOARD_SIZE + 1));
    for row in grid {
        for cell in row {
            out.push(cell.map_or('-', Mark::as_char));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn empty_grid_is_in_progress() {
        let grid: Grid = [[E; 3]; 3];
        assert!(!has_won(&grid, Mark::X));
        assert!(!is_full(&grid));
        assert_eq!(evaluate(&grid, Mark::X), Outcome::InProgress);
    }

    #[test]
    fn top_row_wins() {
        let grid = [[X, X, X], [E, E, E], [E, E, E]];
        assert_eq!(evaluate(&grid, Mark::X), Outcome::Won(Mark::X));
    }

    #[test]
    fn column_and_anti_diagonal_win() {
        let column = [[E, O, E], [X, O, E], [X, O, X]];
        assert_eq!(evaluate(&column, Mark::O), Outcome::Won(Mark::O));

        let anti = [[E, E, X], [O, X, E], [X, O, E]];
        assert_eq!(evaluate(&anti, Mark::X), Outcome::Won(Mark::X));
    }

    #[test]
    fn only_the_mover_is_checked() {
        let grid = [[X, X, X], [O, O, E], [E, E, E]];
        assert_eq!(evaluate(&grid, Mark::O), Outcome::InProgress);
    }

    #[test]
    fn full_grid_without_line_is_tied() {
        let grid = [[X, O, X], [X, O, O], [O, X, X]];
        assert_eq!(evaluate(&grid, Mark::X), Outcome::Tied);
    }

    #[test]
    fn win_is_checked_before_tie() {
        let grid = [[X, O, X], [O, X, O], [O, X, X]];
        assert!(is_full(&grid));
        assert_eq!(evaluate(&grid, Mark::X), Outcome::Won(Mark::X));
    }

    #[test]
    fn render_uses_dashes_for_empty_cells() {
        let grid = [[X, E, E], [E, O, E], [E, E, X]];
        assert_eq!(render(&grid), "X--\n-O-\n--X\n");
    }

    #[test]
    fn winner_labels() {
        assert_eq!(Outcome::InProgress.winner_label(), None);
        assert_eq!(Outcome::Won(Mark::O).winner_label().as_deref(), Some("O"));
        assert_eq!(Outcome::Tied.winner_label().as_deref(), Some("tie"));
    }
}
