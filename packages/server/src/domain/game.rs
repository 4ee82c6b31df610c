//! State of one game inside a room.

use super::board::{Board, Coord, Side};
use super::error::MoveRejection;
use super::rule::{self, RuleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub coord: Coord,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Ongoing,
    Won(Side),
    Resigned { winner: Side },
    Draw,
    /// A player left mid-game
    Aborted,
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameResult::Ongoing)
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            GameResult::Won(side) | GameResult::Resigned { winner: side } => Some(*side),
            GameResult::Ongoing | GameResult::Draw | GameResult::Aborted => None,
        }
    }
}

/// An accepted move and what it did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub played: Move,
    pub move_number: usize,
    pub result: GameResult,
}

#[derive(Debug, Clone)]
pub struct GameState {
    rules: RuleSet,
    board: Board,
    moves: Vec<Move>,
    current_turn: Side,
    result: GameResult,
}

impl GameState {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            board: Board::new(),
            moves: Vec::new(),
            current_turn: Side::Black,
            result: GameResult::Ongoing,
        }
    }

    /// Resumes from `board` with `turn` to move and no move history
    #[cfg(test)]
    pub fn from_position(rules: RuleSet, board: Board, turn: Side) -> Self {
        Self {
            rules,
            board,
            moves: Vec::new(),
            current_turn: turn,
            result: GameResult::Ongoing,
        }
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Checks turn, bounds, occupancy and forbidden patterns, in that order
    pub fn validate(&self, side: Side, row: i32, col: i32) -> Result<Coord, MoveRejection> {
        if self.result.is_over() {
            return Err(MoveRejection::NotPlaying);
        }
        if side != self.current_turn {
            return Err(MoveRejection::NotYourTurn);
        }
        let coord = Coord::from_signed(row, col)?;
        if !self.board.is_empty(coord) {
            return Err(MoveRejection::Occupied {
                row: coord.row,
                col: coord.col,
            });
        }
        if let Some(forbidden) = self.rules.forbidden(&self.board, coord, side) {
            return Err(MoveRejection::Forbidden(forbidden));
        }
        Ok(coord)
    }

    pub fn play(&mut self, side: Side, row: i32, col: i32) -> Result<MoveOutcome, MoveRejection> {
        let coord = self.validate(side, row, col)?;
        self.board.place(coord, side)?;
        let played = Move { coord, side };
        self.moves.push(played);

        self.result = if rule::wins_at(&self.board, coord, side) {
            GameResult::Won(side)
        } else if self.board.is_full() {
            GameResult::Draw
        } else {
            self.current_turn = side.opponent();
            GameResult::Ongoing
        };

        Ok(MoveOutcome {
            played,
            move_number: self.moves.len(),
            result: self.result,
        })
    }

    /// Ends the game in favour of the opponent of `loser`
    pub fn resign(&mut self, loser: Side) -> Result<Side, MoveRejection> {
        if self.result.is_over() {
            return Err(MoveRejection::NotPlaying);
        }
        let winner = loser.opponent();
        self.result = GameResult::Resigned { winner };
        Ok(winner)
    }

    pub fn abort(&mut self) {
        if !self.result.is_over() {
            self.result = GameResult::Aborted;
        }
    }
}
