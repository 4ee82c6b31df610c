//! Board, sides and coordinates.

use std::fmt;

pub use goishi_shared::protocol::BOARD_SIZE;

use super::error::MoveRejection;

/// The four line directions a run can extend in (horizontal, vertical, both diagonals)
pub const DIRECTIONS: [Direction; 4] = [
    Direction { dr: 0, dc: 1 },
    Direction { dr: 1, dc: 0 },
    Direction { dr: 1, dc: 1 },
    Direction { dr: 1, dc: -1 },
];

/// Side of a player; black moves first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Black, Side::White];

    pub fn opponent(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Cell value in board snapshots
    pub fn cell_value(self) -> u8 {
        match self {
            Side::Black => 1,
            Side::White => 2,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Black => f.write_str("black"),
            Side::White => f.write_str("white"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub dr: isize,
    pub dc: isize,
}

/// An intersection known to lie on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    /// Validates untrusted wire coordinates
    pub fn from_signed(row: i32, col: i32) -> Result<Self, MoveRejection> {
        let in_range = |v: i32| usize::try_from(v).ok().filter(|v| *v < BOARD_SIZE);
        match (in_range(row), in_range(col)) {
            (Some(row), Some(col)) => Ok(Self { row, col }),
            _ => Err(MoveRejection::OutOfBounds { row, col }),
        }
    }

    /// The coordinate `steps` cells away along `dir`, if still on the board
    pub fn step(self, dir: Direction, steps: isize) -> Option<Self> {
        let row = self.row as isize + dir.dr * steps;
        let col = self.col as isize + dir.dc * steps;
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as usize, col as usize)
    }

    pub fn center() -> Self {
        Self {
            row: BOARD_SIZE / 2,
            col: BOARD_SIZE / 2,
        }
    }
}

/// 15×15 grid of stones
///
/// A non-empty intersection never changes again within one game: `place`
/// refuses occupied cells and there is no removal.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Side>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn get(&self, coord: Coord) -> Option<Side> {
        self.cells[coord.row][coord.col]
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    pub fn place(&mut self, coord: Coord, side: Side) -> Result<(), MoveRejection> {
        if !self.is_empty(coord) {
            return Err(MoveRejection::Occupied {
                row: coord.row,
                col: coord.col,
            });
        }
        self.cells[coord.row][coord.col] = Some(side);
        Ok(())
    }

    /// A copy of the board with `side` on `coord`, for hypothetical analysis.
    /// The caller guarantees `coord` is empty.
    pub fn with_stone(&self, coord: Coord, side: Side) -> Board {
        let mut next = self.clone();
        next.cells[coord.row][coord.col] = Some(side);
        next
    }

    /// Consecutive `side` stones beyond `coord` as `(backward, forward)` counts.
    /// `coord` itself is not inspected.
    pub fn run_extent(&self, coord: Coord, dir: Direction, side: Side) -> (usize, usize) {
        let count = |sign: isize| {
            (1..)
                .map_while(|steps| coord.step(dir, sign * steps))
                .take_while(|c| self.get(*c) == Some(side))
                .count()
        };
        (count(-1), count(1))
    }

    /// Length of the `side` run through `coord`, counting `coord` as one of them
    pub fn run_length(&self, coord: Coord, dir: Direction, side: Side) -> usize {
        let (back, forward) = self.run_extent(coord, dir, side);
        back + forward + 1
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coord { row, col }))
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells().filter(|c| self.is_empty(*c))
    }

    pub fn stone_count(&self) -> usize {
        self.cells().filter(|c| !self.is_empty(*c)).count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_cells().next().is_none()
    }

    /// Row-major cell values (`0` empty, `1` black, `2` white)
    pub fn cell_values(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.map_or(0, Side::cell_value)).collect())
            .collect()
    }

    /// Builds a board from text rows: `X` black, `O` white, anything else empty
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Board {
        let mut board = Board::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let side = match ch {
                    'X' => Some(Side::Black),
                    'O' => Some(Side::White),
                    _ => None,
                };
                board.cells[row][col] = side;
            }
        }
        board
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|c| match c {
                    Some(Side::Black) => 'X',
                    Some(Side::White) => 'O',
                    None => '.',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
