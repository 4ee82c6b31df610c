//! Port to an external move-reasoning service.

use async_trait::async_trait;
use goishi_shared::protocol::GameType;

use super::board::{Board, Side};
use super::error::ReasoningError;
use super::game::Move;
use super::rule::RuleSet;
use super::threat::Threat;

/// Everything the reasoning service is told about the position
#[derive(Debug, Clone)]
pub struct ReasoningQuery {
    pub game_type: GameType,
    pub rules: RuleSet,
    pub board: Board,
    pub side: Side,
    pub last_move: Option<Move>,
    /// Opponent threats, most urgent first
    pub threats: Vec<Threat>,
}

/// A raw suggestion; not yet checked against the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub row: i32,
    pub col: i32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn suggest_move(&self, query: &ReasoningQuery) -> Result<Suggestion, ReasoningError>;
}
