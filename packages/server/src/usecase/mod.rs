//! UseCase 層
//!
//! WebSocket のイベント一つひとつに対応する操作を提供します。
//! Domain 層のポート（RoomRepository, MessagePusher など）にのみ依存し、
//! 具体的な実装は UI 層で組み立てて渡します。

pub mod ai_turn;
pub mod connect_player;
pub mod create_room;
pub mod decide_move;
pub mod disconnect_player;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod notifier;
pub mod quick_match;
pub mod rematch;
pub mod report_game_over;
pub mod room_list;
pub mod start_game;
pub mod submit_move;
pub mod toggle_ready;

#[cfg(test)]
mod test_support;

pub use ai_turn::{AiTurn, AiTurnUseCase};
pub use connect_player::ConnectPlayerUseCase;
pub use create_room::CreateRoomUseCase;
pub use decide_move::{DecideMoveUseCase, Decision, DecisionSource};
pub use disconnect_player::DisconnectPlayerUseCase;
pub use error::{ConnectError, MatchmakingError, MoveError, RoomActionError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::{LeaveOutcome, LeaveRoomUseCase};
pub use notifier::Notifier;
pub use quick_match::{QuickMatchOutcome, QuickMatchUseCase};
pub use rematch::RematchUseCase;
pub use report_game_over::{GameOverOutcome, ReportGameOverUseCase};
pub use room_list::GetRoomListUseCase;
pub use start_game::StartGameUseCase;
pub use submit_move::SubmitMoveUseCase;
pub use toggle_ready::ToggleReadyUseCase;
