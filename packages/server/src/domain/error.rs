//! ドメイン層のエラー定義

use thiserror::Error;

use super::board::Side;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Room のライフサイクル操作が拒否された理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room is full")]
    Full,

    #[error("game already in progress")]
    AlreadyPlaying,

    #[error("wrong password")]
    WrongPassword,

    #[error("already in this room")]
    AlreadyMember,

    #[error("not a member of this room")]
    NotMember,

    #[error("only the host can start the game")]
    NotHost,

    #[error("need {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("not all players are ready")]
    NotAllReady,

    #[error("room is not waiting for players")]
    NotWaiting,

    #[error("no finished game to rematch")]
    RematchUnavailable,

    #[error("no rematch request to answer")]
    NoPendingRematch,

    #[error("rematch already requested")]
    RematchAlreadyRequested,
}

/// Forbidden patterns for the restricted side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Forbidden {
    #[error("double-three")]
    DoubleThree,

    #[error("double-four")]
    DoubleFour,

    #[error("overline")]
    Overline,
}

/// 着手が拒否された理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("game is not in progress")]
    NotPlaying,

    #[error("not a member of this room")]
    NotMember,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("you are playing {actual}, not {claimed}")]
    SideMismatch { claimed: Side, actual: Side },

    #[error("({row}, {col}) is outside the board")]
    OutOfBounds { row: i32, col: i32 },

    #[error("({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },

    #[error("forbidden move: {0}")]
    Forbidden(Forbidden),
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' already exists")]
    DuplicateRoom(String),

    #[error("connection '{connection}' is already in room '{room}'")]
    AlreadyBound { connection: String, room: String },
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// External reasoning service failures. Every variant degrades to the local heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReasoningError {
    #[error("reasoning service is not configured")]
    Disabled,

    #[error("reasoning request failed: {0}")]
    Request(String),

    #[error("reasoning service returned HTTP {0}")]
    Status(u16),

    #[error("unusable reasoning response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("statistics service is not configured")]
    Disabled,

    #[error("statistics request failed: {0}")]
    Request(String),

    #[error("unusable statistics response: {0}")]
    InvalidResponse(String),
}
