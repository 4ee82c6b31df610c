//! UseCase 層のエラー定義

use goishi_shared::protocol::GameType;
use thiserror::Error;

use crate::domain::{MoveRejection, RoomError, ValueObjectError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchmakingError {
    #[error("matching failed, please retry")]
    MatchingFailed,

    #[error("already in room '{0}'; leave it first")]
    AlreadyInRoom(String),

    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),
}

/// createRoom / joinRoom / leaveRoom / toggleReady / startGame / rematch のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomActionError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' already exists")]
    RoomIdTaken(String),

    #[error("already in room '{0}'; leave it first")]
    AlreadyInRoom(String),

    #[error("room '{room}' plays {actual}, not {requested}")]
    GameTypeMismatch {
        room: String,
        requested: GameType,
        actual: GameType,
    },

    #[error("quick match rooms cannot be joined directly")]
    QuickMatchRoom,

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),
}

/// move / gameOver のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{room}' plays {actual}, not {requested}")]
    GameTypeMismatch {
        room: String,
        requested: GameType,
        actual: GameType,
    },

    #[error(transparent)]
    Rejected(#[from] MoveRejection),

    #[error("reported result does not match the board")]
    ResultNotConfirmed,
}
