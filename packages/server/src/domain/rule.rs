//! Five-in-a-row rules and forbidden-move detection.
//!
//! The restricted side (black under renju) may not play a move that creates
//! an overline, two fours, or two open threes, unless the same move
//! completes an exact five.

use goishi_shared::protocol::GameType;

use super::board::{Board, Coord, DIRECTIONS, Direction, Side};
use super::error::Forbidden;

/// How deep "is this three's four-point itself playable" may recurse
const THREE_LOOKAHEAD_DEPTH: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    restricted: Option<Side>,
}

/// Four and three counts a placement produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointShape {
    pub fours: usize,
    pub straight_fours: usize,
    pub threes: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LineFours {
    /// Distinct stone sets that complete to a five
    fours: usize,
    /// Empty cells that complete one of them
    completions: usize,
}

impl LineFours {
    fn is_straight(&self) -> bool {
        self.fours == 1 && self.completions >= 2
    }
}

impl RuleSet {
    pub fn for_game(game: GameType) -> Self {
        match game {
            GameType::Renju => Self::renju(),
            GameType::Freestyle => Self::freestyle(),
        }
    }

    pub fn renju() -> Self {
        Self {
            restricted: Some(Side::Black),
        }
    }

    pub fn freestyle() -> Self {
        Self { restricted: None }
    }

    pub fn restricted_side(&self) -> Option<Side> {
        self.restricted
    }

    pub fn is_restricted(&self, side: Side) -> bool {
        self.restricted == Some(side)
    }

    /// The restricted side needs exactly five; anyone else wins with five or more.
    fn completes(&self, side: Side, len: usize) -> bool {
        if self.is_restricted(side) {
            len == 5
        } else {
            len >= 5
        }
    }

    /// Whether `side` playing the empty `coord` wins on the spot
    pub fn makes_five(&self, board: &Board, coord: Coord, side: Side) -> bool {
        let placed = board.with_stone(coord, side);
        DIRECTIONS
            .iter()
            .any(|&dir| self.completes(side, placed.run_length(coord, dir, side)))
    }

    /// Why `side` may not play the empty `coord`, if it may not
    pub fn forbidden(&self, board: &Board, coord: Coord, side: Side) -> Option<Forbidden> {
        if !self.is_restricted(side) {
            return None;
        }
        self.forbidden_at(board, coord, side, THREE_LOOKAHEAD_DEPTH)
    }

    pub fn is_legal(&self, board: &Board, coord: Coord, side: Side) -> bool {
        board.is_empty(coord) && self.forbidden(board, coord, side).is_none()
    }

    /// Counts the fours and threes `side` would make by playing `coord`
    pub fn shape(&self, board: &Board, coord: Coord, side: Side) -> PointShape {
        let placed = board.with_stone(coord, side);
        let mut shape = PointShape::default();
        for dir in DIRECTIONS {
            let line = self.fours_in_line(&placed, coord, dir, side);
            if line.fours > 0 {
                shape.fours += line.fours;
                if line.is_straight() {
                    shape.straight_fours += 1;
                }
            } else if self.is_three_in_line(&placed, coord, dir, side, THREE_LOOKAHEAD_DEPTH) {
                shape.threes += 1;
            }
        }
        shape
    }

    fn forbidden_at(&self, board: &Board, coord: Coord, side: Side, depth: u8) -> Option<Forbidden> {
        let placed = board.with_stone(coord, side);
        let lengths = DIRECTIONS.map(|dir| placed.run_length(coord, dir, side));
        if lengths.contains(&5) {
            return None;
        }
        if lengths.iter().any(|len| *len > 5) {
            return Some(Forbidden::Overline);
        }

        let mut fours = 0;
        let mut threes = 0;
        for dir in DIRECTIONS {
            let line = self.fours_in_line(&placed, coord, dir, side);
            if line.fours > 0 {
                fours += line.fours;
            } else if depth > 0 && self.is_three_in_line(&placed, coord, dir, side, depth) {
                threes += 1;
            }
        }

        if fours >= 2 {
            Some(Forbidden::DoubleFour)
        } else if threes >= 2 {
            Some(Forbidden::DoubleThree)
        } else {
            None
        }
    }

    /// `placed` already holds `side` on `coord`.
    fn fours_in_line(&self, placed: &Board, coord: Coord, dir: Direction, side: Side) -> LineFours {
        let mut stone_sets: Vec<u32> = Vec::new();
        let mut completions = 0;

        for k in -4isize..=4 {
            if k == 0 {
                continue;
            }
            let Some(cell) = coord.step(dir, k) else {
                continue;
            };
            if !placed.is_empty(cell) {
                continue;
            }
            let completed = placed.with_stone(cell, side);
            let (back, forward) = completed.run_extent(coord, dir, side);
            let (low, high) = (-(back as isize), forward as isize);
            if !self.completes(side, back + forward + 1) || k < low || k > high {
                continue;
            }
            completions += 1;
            let set = (low..=high)
                .filter(|offset| *offset != k)
                .fold(0u32, |set, offset| set | 1 << (offset + 16));
            if !stone_sets.contains(&set) {
                stone_sets.push(set);
            }
        }

        LineFours {
            fours: stone_sets.len(),
            completions,
        }
    }

    /// A three is a line where one more stone makes a straight four whose
    /// four-point is itself playable.
    fn is_three_in_line(
        &self,
        placed: &Board,
        coord: Coord,
        dir: Direction,
        side: Side,
        depth: u8,
    ) -> bool {
        for k in -3isize..=3 {
            if k == 0 {
                continue;
            }
            let Some(cell) = coord.step(dir, k) else {
                continue;
            };
            if !placed.is_empty(cell) {
                continue;
            }
            let completed = placed.with_stone(cell, side);
            let (back, forward) = completed.run_extent(coord, dir, side);
            if back + forward + 1 != 4 || k < -(back as isize) || k > forward as isize {
                continue;
            }
            if !self.fours_in_line(&completed, coord, dir, side).is_straight() {
                continue;
            }
            if self.is_restricted(side)
                && self
                    .forbidden_at(placed, cell, side, depth.saturating_sub(1))
                    .is_some()
            {
                continue;
            }
            return true;
        }
        false
    }
}

/// Post-acceptance win check: five or more in a row through `coord`
pub fn wins_at(board: &Board, coord: Coord, side: Side) -> bool {
    DIRECTIONS
        .iter()
        .any(|&dir| board.run_length(coord, dir, side) >= 5)
}
