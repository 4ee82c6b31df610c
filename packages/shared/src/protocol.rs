//! WebSocket event vocabulary shared by the server and the client.
//!
//! Client frames carry the game type they address:
//!
//! ```text
//! {"game": "renju", "event": {"type": "move", "payload": {"roomId": "...", "row": 7, "col": 7}}}
//! ```
//!
//! Server events are sent bare:
//!
//! ```text
//! {"type": "moved", "payload": {"row": 7, "col": 7, "side": "black", "socketId": "...", "moveNumber": 1}}
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

/// Width and height of the board for every supported game type.
pub const BOARD_SIZE: usize = 15;

/// Cell value for an empty intersection in board snapshots.
pub const EMPTY_CELL: u8 = 0;

/// Game type discriminator
///
/// Selects the rule set and the role assignment strategy of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Five-in-a-row with forbidden moves (double-three, double-four, overline) for black
    Renju,
    /// Five-or-more in a row, no restrictions
    Freestyle,
}

impl GameType {
    pub const ALL: [GameType; 2] = [GameType::Renju, GameType::Freestyle];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Renju => "renju",
            GameType::Freestyle => "freestyle",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .into_iter()
            .find(|game| game.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown game type '{}'", s))
    }
}

/// Stone color as seen on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Cell value used in board snapshots (`1` black, `2` white)
    pub fn cell_value(self) -> u8 {
        match self {
            Color::Black => 1,
            Color::White => 2,
        }
    }

    pub fn from_cell_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Color::Black),
            2 => Some(Color::White),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

// ========================================
// Client → Server
// ========================================

/// A client request addressed to one game type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub game: GameType,
    pub event: ClientEvent,
}

impl ClientFrame {
    pub fn new(game: GameType, event: ClientEvent) -> Self {
        Self { game, event }
    }
}

/// Client → server events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientEvent {
    QuickMatch(QuickMatchPayload),
    CreateRoom(CreateRoomPayload),
    JoinRoom(JoinRoomPayload),
    LeaveRoom(RoomRef),
    ToggleReady(RoomRef),
    StartGame(RoomRef),
    Move(MovePayload),
    GameOver(GameOverPayload),
    GetRoomList,
    RequestRematch(RoomRef),
    AcceptRematch(RoomRef),
    DeclineRematch(RoomRef),
}

impl ClientEvent {
    /// Event name as it appears in the `type` field
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::QuickMatch(_) => "quickMatch",
            ClientEvent::CreateRoom(_) => "createRoom",
            ClientEvent::JoinRoom(_) => "joinRoom",
            ClientEvent::LeaveRoom(_) => "leaveRoom",
            ClientEvent::ToggleReady(_) => "toggleReady",
            ClientEvent::StartGame(_) => "startGame",
            ClientEvent::Move(_) => "move",
            ClientEvent::GameOver(_) => "gameOver",
            ClientEvent::GetRoomList => "getRoomList",
            ClientEvent::RequestRematch(_) => "requestRematch",
            ClientEvent::AcceptRematch(_) => "acceptRematch",
            ClientEvent::DeclineRematch(_) => "declineRematch",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickMatchPayload {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub room_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub password: Option<String>,
    /// Caller-supplied id for a named room; generated when absent
    #[serde(default)]
    pub room_id: Option<String>,
    /// Seat an AI opponent right away
    #[serde(default)]
    pub vs_ai: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: String,
}

impl RoomRef {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
        }
    }
}

/// Coordinates are signed so that out-of-range input reaches the rule engine
/// and is rejected there instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub room_id: String,
    pub row: i32,
    pub col: i32,
    #[serde(default)]
    pub side: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverPayload {
    pub room_id: String,
    pub winner: Option<Color>,
}

// ========================================
// Server → Client
// ========================================

/// Server → client events
///
/// `ServerEventKind` (generated) names each variant without its payload and
/// is the key of the client-side handler table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(ServerEventKind), derive(Hash))]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Connected {
        socket_id: String,
    },
    Waiting {
        message: String,
    },
    Assigned {
        color: Color,
        room_id: String,
    },
    RoomCreated {
        room_id: String,
        room_data: RoomData,
    },
    JoinSuccess {
        room_data: RoomData,
    },
    JoinError {
        message: String,
    },
    PlayerJoined {
        room_data: RoomData,
    },
    PlayerLeft {
        room_data: RoomData,
        username: String,
    },
    PlayerReady {
        room_data: RoomData,
    },
    HostChanged {
        room_data: RoomData,
    },
    GameStart {
        room_id: String,
        room_data: RoomData,
    },
    Moved {
        row: usize,
        col: usize,
        side: Color,
        socket_id: String,
        move_number: usize,
    },
    GameOver {
        winner: Option<Color>,
        reason: GameOverReason,
    },
    GameAborted {
        reason: String,
        leaving_player: String,
    },
    RoomListUpdate {
        rooms: Vec<RoomSummary>,
    },
    RematchRequested {
        party: String,
    },
    RematchAccepted {
        party: String,
    },
    RematchDeclined {
        party: String,
    },
    RematchStart {
        room_data: RoomData,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn kind(&self) -> ServerEventKind {
        self.into()
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOverReason {
    FiveInARow,
    Resignation,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatusDto {
    Waiting,
    Playing,
    Finished,
}

/// Full room snapshot sent with lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    pub room_id: String,
    pub room_name: String,
    pub game_type: GameType,
    pub host_id: String,
    pub players: Vec<PlayerData>,
    pub is_private: bool,
    pub has_password: bool,
    pub max_players: usize,
    pub status: RoomStatusDto,
    pub created_at: i64,
    pub quick_match: bool,
    /// `BOARD_SIZE` rows of cell values; absent before the first game starts
    pub board: Option<Vec<Vec<u8>>>,
    pub current_turn: Option<Color>,
    pub move_count: usize,
    pub last_move: Option<MoveData>,
    pub winner: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub socket_id: String,
    pub user_id: Option<String>,
    pub username: String,
    pub is_ready: bool,
    pub color: Option<Color>,
    pub joined_at: i64,
    pub is_ai: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub row: usize,
    pub col: usize,
    pub side: Color,
}

/// Room list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub room_name: String,
    pub game_type: GameType,
    pub player_count: usize,
    pub max_players: usize,
    pub status: RoomStatusDto,
    pub is_private: bool,
    pub host_username: String,
    pub host_stats: PlayerStats,
}

/// Win/loss summary from the statistics service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
}
