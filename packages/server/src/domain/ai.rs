//! Local move heuristics for AI seats.
//!
//! `local_candidate` never fails while the board has an empty cell.
//! `fallback_cell` can, once every remaining cell is forbidden.

use rand::{Rng, seq::SliceRandom};

use super::board::{Board, Coord, Side};
use super::rule::RuleSet;
use super::threat::Threat;

/// A cell that wins for `side` on the spot
pub fn immediate_win(board: &Board, rules: RuleSet, side: Side) -> Option<Coord> {
    board
        .empty_cells()
        .find(|coord| rules.is_legal(board, *coord, side) && rules.makes_five(board, *coord, side))
}

pub fn legal_cells(board: &Board, rules: RuleSet, side: Side) -> Vec<Coord> {
    board
        .empty_cells()
        .filter(|coord| rules.forbidden(board, *coord, side).is_none())
        .collect()
}

/// Most urgent threat cell `side` may legally play
pub fn top_blocking_cell(board: &Board, rules: RuleSet, side: Side, threats: &[Threat]) -> Option<Coord> {
    threats
        .iter()
        .map(|t| t.coord)
        .find(|coord| rules.is_legal(board, *coord, side))
}

/// Random legal cell; if every empty cell is forbidden, any empty cell
pub fn random_cell<R: Rng + ?Sized>(board: &Board, rules: RuleSet, side: Side, rng: &mut R) -> Option<Coord> {
    let legal = legal_cells(board, rules, side);
    if let Some(coord) = legal.choose(rng) {
        return Some(*coord);
    }
    let empty: Vec<Coord> = board.empty_cells().collect();
    empty.choose(rng).copied()
}

/// Random legal cell other than `rejected`. Unlike [`random_cell`] this
/// never falls back to a forbidden cell.
pub fn fallback_cell<R: Rng + ?Sized>(
    board: &Board,
    rules: RuleSet,
    side: Side,
    rejected: Coord,
    rng: &mut R,
) -> Option<Coord> {
    let candidates: Vec<Coord> = legal_cells(board, rules, side)
        .into_iter()
        .filter(|coord| *coord != rejected)
        .collect();
    candidates.choose(rng).copied()
}

/// Black to move; both empty cells, (0, 3) and (14, 11), make an overline
#[cfg(test)]
pub(crate) const OVERLINE_ONLY: [&str; 15] = [
    "XXX.XXXOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXOOXXO",
    "OOXXOOXXOOXXOOX",
    "XXOOXXOOXXX.XXX",
];

/// Own win, then the top blockable threat, then a random legal cell
pub fn local_candidate<R: Rng + ?Sized>(
    board: &Board,
    rules: RuleSet,
    side: Side,
    threats: &[Threat],
    rng: &mut R,
) -> Option<Coord> {
    if board.stone_count() == 0 {
        return Some(Coord::center());
    }
    immediate_win(board, rules, side)
        .or_else(|| top_blocking_cell(board, rules, side, threats))
        .or_else(|| random_cell(board, rules, side, rng))
}
