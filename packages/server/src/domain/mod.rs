//! Domain 層
//!
//! 盤面・ルール・Room のライフサイクルといった、外部 I/O を持たない
//! ビジネスロジックと、Infrastructure 層が実装するポート（trait）を定義します。

pub mod ai;
pub mod board;
pub mod entity;
pub mod error;
pub mod game;
pub mod message_pusher;
pub mod reasoning;
pub mod repository;
pub mod role;
pub mod rule;
pub mod stats;
pub mod threat;
pub mod value_object;

pub use board::{BOARD_SIZE, Board, Coord, Side};
pub use entity::{Departure, MAX_PLAYERS, Player, PlayerKind, Room, RoomStatus};
pub use error::{
    Forbidden, MessagePushError, MoveRejection, ReasoningError, RepositoryError, RoomError,
    StatsError, ValueObjectError,
};
pub use game::{GameResult, GameState, Move, MoveOutcome};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use reasoning::{ReasoningBackend, ReasoningQuery, Suggestion};
pub use repository::{RoomHandle, RoomRepository};
pub use role::{JoinOrderRoles, RoleAssigner, RoleAssigners, ShuffledRoles};
pub use rule::RuleSet;
pub use stats::StatsProvider;
pub use threat::{Threat, ThreatKind, detect_threats};
pub use value_object::{
    ConnectionId, Password, RoomId, RoomIdFactory, RoomName, Timestamp, UserId, Username,
};
