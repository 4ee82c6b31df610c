//! Conversion logic between domain entities and protocol DTOs.

use goishi_shared::protocol::{
    Color, MoveData, PlayerData, PlayerStats, RoomData, RoomStatusDto, RoomSummary,
};

use crate::domain::{Move, Player, Room, RoomStatus, Side};

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Side::Black,
            Color::White => Side::White,
        }
    }
}

impl From<RoomStatus> for RoomStatusDto {
    fn from(status: RoomStatus) -> Self {
        match status {
            RoomStatus::Waiting => RoomStatusDto::Waiting,
            RoomStatus::Playing => RoomStatusDto::Playing,
            RoomStatus::Finished => RoomStatusDto::Finished,
        }
    }
}

impl From<Move> for MoveData {
    fn from(model: Move) -> Self {
        Self {
            row: model.coord.row,
            col: model.coord.col,
            side: model.side.into(),
        }
    }
}

impl From<&Player> for PlayerData {
    fn from(model: &Player) -> Self {
        Self {
            socket_id: model.connection_id.to_string(),
            user_id: model.user_id.as_ref().map(|id| id.to_string()),
            username: model.username.to_string(),
            is_ready: model.is_ready,
            color: model.side.map(Color::from),
            joined_at: model.joined_at.value(),
            is_ai: model.is_ai(),
        }
    }
}

impl From<&Room> for RoomData {
    fn from(model: &Room) -> Self {
        let game = model.game();
        Self {
            room_id: model.id.to_string(),
            room_name: model.name.to_string(),
            game_type: model.game_type,
            host_id: model.host().to_string(),
            players: model.players().iter().map(PlayerData::from).collect(),
            is_private: model.is_private,
            has_password: model.has_password(),
            max_players: model.max_players,
            status: model.status().into(),
            created_at: model.created_at.value(),
            quick_match: model.quick_match,
            board: game.map(|g| g.board().cell_values()),
            current_turn: game
                .filter(|g| !g.result().is_over())
                .map(|g| g.current_turn().into()),
            move_count: game.map_or(0, |g| g.move_count()),
            last_move: game.and_then(|g| g.last_move()).map(MoveData::from),
            winner: game.and_then(|g| g.result().winner()).map(Color::from),
        }
    }
}

/// Room list entry; `host_stats` is filled in by the caller when available
pub fn room_summary(model: &Room, host_stats: PlayerStats) -> RoomSummary {
    RoomSummary {
        room_id: model.id.to_string(),
        room_name: model.name.to_string(),
        game_type: model.game_type,
        player_count: model.players().len(),
        max_players: model.max_players,
        status: model.status().into(),
        is_private: model.is_private,
        host_username: model
            .host_player()
            .map(|p| p.username.to_string())
            .unwrap_or_default(),
        host_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, JoinOrderRoles, RoomId, RoomName, Timestamp, Username};
    use goishi_shared::protocol::GameType;

    fn player(name: &str) -> Player {
        Player::human(
            ConnectionId::new(name.to_string()).unwrap(),
            None,
            Username::new(name.to_string()).unwrap(),
            Timestamp::new(5),
        )
    }

    fn create_test_room() -> Room {
        Room::new(
            RoomId::new("den".to_string()).unwrap(),
            RoomName::new("Den".to_string()).unwrap(),
            GameType::Renju,
            player("alice"),
            Timestamp::new(1),
        )
    }

    #[test]
    fn test_waiting_room_to_room_data() {
        // テスト項目: 対局前の Room は盤面なしの RoomData になる
        // given (前提条件):
        let room = create_test_room();

        // when (操作):
        let data = RoomData::from(&room);

        // then (期待する結果):
        assert_eq!(data.room_id, "den");
        assert_eq!(data.host_id, "alice");
        assert_eq!(data.status, RoomStatusDto::Waiting);
        assert_eq!(data.board, None);
        assert_eq!(data.current_turn, None);
        assert_eq!(data.players[0].joined_at, 5);
        assert!(!data.players[0].is_ai);
    }

    #[test]
    fn test_playing_room_includes_board_and_turn() {
        // テスト項目: 対局中の Room は盤面・手番・最終手を含む
        // given (前提条件):
        let mut room = create_test_room();
        room.add_player(player("bob"), None).unwrap();
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        let bob = ConnectionId::new("bob".to_string()).unwrap();
        room.toggle_ready(&alice).unwrap();
        room.toggle_ready(&bob).unwrap();
        room.start(&alice, &JoinOrderRoles).unwrap();
        room.submit_move(&alice, 7, 7, None).unwrap();

        // when (操作):
        let data = RoomData::from(&room);

        // then (期待する結果):
        assert_eq!(data.status, RoomStatusDto::Playing);
        assert_eq!(data.board.as_ref().unwrap()[7][7], 1);
        assert_eq!(data.current_turn, Some(Color::White));
        assert_eq!(data.move_count, 1);
        assert_eq!(
            data.last_move,
            Some(MoveData { row: 7, col: 7, side: Color::Black })
        );
        assert_eq!(data.players[0].color, Some(Color::Black));
    }

    #[test]
    fn test_room_summary() {
        // テスト項目: 一覧用の要約にホスト名と戦績が入る
        let summary = room_summary(&create_test_room(), PlayerStats { wins: 3, losses: 1 });
        assert_eq!(summary.host_username, "alice");
        assert_eq!(summary.player_count, 1);
        assert_eq!(summary.host_stats.wins, 3);
    }
}
