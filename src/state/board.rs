//! Pure 3×3 board logic: move application and outcome evaluation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;
use utoipa::ToSchema;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 3;

/// Mark placed on the board by one of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Symbol {
    /// Always held by the session creator.
    X,
    /// Always held by the joining player.
    O,
}

impl Symbol {
    fn as_str(self) -> &'static str {
        match self {
            Symbol::X => "X",
            Symbol::O => "O",
        }
    }

    fn parse(value: &str) -> Option<Option<Self>> {
        match value {
            "" => Some(None),
            "X" => Some(Some(Symbol::X)),
            "O" => Some(Some(Symbol::O)),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when a move cannot be placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The move does not carry exactly a row and a column.
    #[error("a move needs exactly two coordinates (got {0})")]
    Arity(usize),
    /// A coordinate falls outside of `[0, 2]`.
    #[error("cell ({row}, {col}) is outside of the board")]
    OutOfBounds {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },
    /// The target cell already holds a symbol.
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied {
        /// Row of the occupied cell.
        row: usize,
        /// Column of the occupied cell.
        col: usize,
    },
}

/// Validated board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    /// Build a cell, rejecting coordinates outside of the board.
    pub fn new(row: i64, col: i64) -> Result<Self, BoardError> {
        let range = 0..BOARD_SIZE as i64;
        if !range.contains(&row) || !range.contains(&col) {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(Self {
            row: row as usize,
            col: col as usize,
        })
    }

    /// Build a cell from a raw `[row, col]` pair as received from clients.
    pub fn from_coordinates(coordinates: &[i64]) -> Result<Self, BoardError> {
        match coordinates {
            [row, col] => Self::new(*row, *col),
            other => Err(BoardError::Arity(other.len())),
        }
    }

    /// Row index in `[0, 2]`.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index in `[0, 2]`.
    pub fn col(&self) -> usize {
        self.col
    }

    fn on_main_diagonal(&self) -> bool {
        self.row == self.col
    }

    fn on_anti_diagonal(&self) -> bool {
        self.row + self.col == BOARD_SIZE - 1
    }
}

/// Result of evaluating the board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winner yet and at least one empty cell remains.
    Ongoing,
    /// The given symbol completed a line.
    Won(Symbol),
    /// Every cell is occupied and nobody completed a line.
    Draw,
}

impl Outcome {
    /// Whether the session ends with this outcome.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// Immutable 3×3 grid. Applying a move yields a new board.
///
/// On the wire each cell is `""`, `"X"` or `"O"`, rows first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Symbol>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An empty board.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a board from explicit rows.
    pub fn from_rows(cells: [[Option<Symbol>; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Symbol held by `cell`, if any.
    pub fn get(&self, cell: Cell) -> Option<Symbol> {
        self.cells[cell.row][cell.col]
    }

    /// Place `symbol` on `cell`, returning the resulting board.
    pub fn apply_move(&self, cell: Cell, symbol: Symbol) -> Result<Board, BoardError> {
        if self.get(cell).is_some() {
            return Err(BoardError::Occupied {
                row: cell.row,
                col: cell.col,
            });
        }
        let mut next = *self;
        next.cells[cell.row][cell.col] = Some(symbol);
        Ok(next)
    }

    /// Evaluate the board right after `played` was filled.
    ///
    /// Only the lines crossing `played` can have been completed by the last move, so the
    /// check is bounded to its row, its column and the diagonals it sits on.
    pub fn evaluate(&self, played: Cell) -> Outcome {
        let Some(symbol) = self.get(played) else {
            return if self.is_full() {
                Outcome::Draw
            } else {
                Outcome::Ongoing
            };
        };

        let owns = |row: usize, col: usize| self.cells[row][col] == Some(symbol);
        let row_won = (0..BOARD_SIZE).all(|col| owns(played.row, col));
        let col_won = (0..BOARD_SIZE).all(|row| owns(row, played.col));
        let main_won = played.on_main_diagonal() && (0..BOARD_SIZE).all(|i| owns(i, i));
        let anti_won = played.on_anti_diagonal()
            && (0..BOARD_SIZE).all(|i| owns(i, BOARD_SIZE - 1 - i));

        if row_won || col_won || main_won || anti_won {
            Outcome::Won(symbol)
        } else if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    /// Whether all nine cells hold a symbol.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows = self
            .cells
            .map(|row| row.map(|cell| cell.map(Symbol::as_str).unwrap_or("")));
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = <[[String; BOARD_SIZE]; BOARD_SIZE]>::deserialize(deserializer)?;
        let mut cells = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                cells[r][c] = Symbol::parse(value).ok_or_else(|| {
                    de::Error::custom(format!("invalid board cell `{value}`"))
                })?;
            }
        }
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Symbol> = Some(Symbol::X);
    const O: Option<Symbol> = Some(Symbol::O);
    const E: Option<Symbol> = None;

    fn cell(row: i64, col: i64) -> Cell {
        Cell::new(row, col).unwrap()
    }

    #[test]
    fn apply_move_fills_only_the_target_cell() {
        for row in 0..3 {
            for col in 0..3 {
                let board = Board::empty().apply_move(cell(row, col), Symbol::O).unwrap();
                for r in 0..3 {
                    for c in 0..3 {
                        let expected = if (r, c) == (row, col) { O } else { E };
                        assert_eq!(board.get(cell(r, c)), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn apply_move_on_occupied_cell_fails_and_keeps_board() {
        let board = Board::empty().apply_move(cell(1, 1), Symbol::X).unwrap();
        let err = board.apply_move(cell(1, 1), Symbol::O).unwrap_err();
        assert_eq!(err, BoardError::Occupied { row: 1, col: 1 });
        assert_eq!(board.get(cell(1, 1)), X);
    }

    #[test]
    fn coordinates_outside_board_are_rejected() {
        assert_eq!(
            Cell::new(3, 0).unwrap_err(),
            BoardError::OutOfBounds { row: 3, col: 0 }
        );
        assert!(Cell::new(0, -1).is_err());
        assert_eq!(
            Cell::from_coordinates(&[1]).unwrap_err(),
            BoardError::Arity(1)
        );
        assert_eq!(
            Cell::from_coordinates(&[1, 1, 1]).unwrap_err(),
            BoardError::Arity(3)
        );
        assert_eq!(Cell::from_coordinates(&[2, 0]).unwrap(), cell(2, 0));
    }

    #[test]
    fn completing_top_row_wins() {
        let board = Board::from_rows([[X, E, X], [E, E, E], [E, E, E]]);
        let board = board.apply_move(cell(0, 1), Symbol::X).unwrap();
        assert_eq!(board.evaluate(cell(0, 1)), Outcome::Won(Symbol::X));
    }

    #[test]
    fn completing_column_wins() {
        let board = Board::from_rows([[E, O, X], [E, O, X], [E, E, E]]);
        let board = board.apply_move(cell(2, 1), Symbol::O).unwrap();
        assert_eq!(board.evaluate(cell(2, 1)), Outcome::Won(Symbol::O));
    }

    #[test]
    fn completing_diagonals_wins() {
        let board = Board::from_rows([[X, O, E], [O, X, E], [E, E, E]]);
        let board = board.apply_move(cell(2, 2), Symbol::X).unwrap();
        assert_eq!(board.evaluate(cell(2, 2)), Outcome::Won(Symbol::X));

        let board = Board::from_rows([[X, X, O], [E, O, E], [E, E, X]]);
        let board = board.apply_move(cell(2, 0), Symbol::O).unwrap();
        assert_eq!(board.evaluate(cell(2, 0)), Outcome::Won(Symbol::O));
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board = Board::from_rows([[X, O, X], [O, O, X], [X, X, E]]);
        let board = board.apply_move(cell(2, 2), Symbol::O).unwrap();
        assert_eq!(board.evaluate(cell(2, 2)), Outcome::Draw);
    }

    #[test]
    fn partial_board_without_line_is_ongoing() {
        let board = Board::empty().apply_move(cell(0, 0), Symbol::X).unwrap();
        assert_eq!(board.evaluate(cell(0, 0)), Outcome::Ongoing);
        assert!(!Outcome::Ongoing.is_terminal());
        assert!(Outcome::Draw.is_terminal());
    }

    #[test]
    fn board_uses_string_cells_on_the_wire() {
        let board = Board::from_rows([[X, E, E], [E, O, E], [E, E, E]]);
        let json = serde_json::to_value(board).unwrap();
        assert_eq!(
            json,
            serde_json::json!([["X", "", ""], ["", "O", ""], ["", "", ""]])
        );
        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);

        let invalid = serde_json::json!([["Z", "", ""], ["", "", ""], ["", "", ""]]);
        assert!(serde_json::from_value::<Board>(invalid).is_err());
    }
}
