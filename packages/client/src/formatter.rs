//! Message formatting utilities for client display.

use goishi_shared::{
    protocol::{Color, GameOverReason, RoomData, RoomStatusDto, RoomSummary, ServerEvent},
    time::millis_to_clock_time,
};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one server event for the console.
    ///
    /// # Arguments
    ///
    /// * `event` - The event received from the server
    /// * `my_socket_id` - This client's socket id (to mark own moves and seats)
    ///
    /// # Returns
    ///
    /// A formatted string, or `None` for events that are not shown
    pub fn format_event(event: &ServerEvent, my_socket_id: Option<&str>) -> Option<String> {
        let text = match event {
            ServerEvent::Connected { socket_id } => format!("connected as {}", socket_id),
            ServerEvent::Waiting { message } => format!("… {}", message),
            ServerEvent::Assigned { color, room_id } => {
                format!("you play {} in room {}", Self::color_name(*color), room_id)
            }
            ServerEvent::RoomCreated { room_data, .. } => {
                format!("room created\n{}", Self::format_room(room_data, my_socket_id))
            }
            ServerEvent::JoinSuccess { room_data } => {
                format!("joined\n{}", Self::format_room(room_data, my_socket_id))
            }
            ServerEvent::JoinError { message } => format!("! cannot join: {}", message),
            ServerEvent::PlayerJoined { room_data } | ServerEvent::PlayerReady { room_data } => {
                Self::format_room(room_data, my_socket_id)
            }
            ServerEvent::PlayerLeft { username, .. } => format!("- {} left the room", username),
            ServerEvent::HostChanged { room_data } => {
                let host = room_data
                    .players
                    .iter()
                    .find(|p| p.socket_id == room_data.host_id)
                    .map_or("?", |p| p.username.as_str());
                format!("host is now {}", host)
            }
            ServerEvent::GameStart { room_data, .. } => {
                format!("game started ({})", room_data.game_type)
            }
            ServerEvent::Moved {
                row,
                col,
                side,
                socket_id,
                move_number,
            } => {
                let who = if Some(socket_id.as_str()) == my_socket_id {
                    " (you)"
                } else {
                    ""
                };
                format!("#{} {} ({}, {}){}", move_number, Self::color_name(*side), row, col, who)
            }
            ServerEvent::GameOver { winner, reason } => Self::format_game_over(*winner, *reason),
            ServerEvent::GameAborted {
                reason,
                leaving_player,
            } => format!("game aborted: {} ({})", reason, leaving_player),
            ServerEvent::RoomListUpdate { rooms } => Self::format_room_list(rooms),
            ServerEvent::RematchRequested { party } => {
                format!("{} wants a rematch (accept / decline)", party)
            }
            ServerEvent::RematchAccepted { party } => format!("{} accepted the rematch", party),
            ServerEvent::RematchDeclined { party } => format!("{} declined the rematch", party),
            ServerEvent::RematchStart { .. } => "rematch started".to_string(),
            ServerEvent::Error { message } => format!("! {}", message),
        };
        let stamp = chrono::Local::now().format("%H:%M:%S");
        Some(format!("\n[{}] {}\n", stamp, text))
    }

    pub fn color_name(color: Color) -> &'static str {
        match color {
            Color::Black => "black (X)",
            Color::White => "white (O)",
        }
    }

    pub fn format_game_over(winner: Option<Color>, reason: GameOverReason) -> String {
        match (winner, reason) {
            (_, GameOverReason::Draw) | (None, _) => "game over: draw".to_string(),
            (Some(color), GameOverReason::FiveInARow) => {
                format!("game over: {} wins with five in a row", Self::color_name(color))
            }
            (Some(color), GameOverReason::Resignation) => {
                format!("game over: {} wins by resignation", Self::color_name(color))
            }
        }
    }

    /// Seats and readiness of a room
    pub fn format_room(room: &RoomData, my_socket_id: Option<&str>) -> String {
        let mut output = format!(
            "{}\n{} [{}] {} {:?}\n",
            RULE, room.room_name, room.room_id, room.game_type, room.status
        );
        for player in &room.players {
            let mut tags = Vec::new();
            if player.socket_id == room.host_id {
                tags.push("host");
            }
            if Some(player.socket_id.as_str()) == my_socket_id {
                tags.push("me");
            }
            if player.is_ai {
                tags.push("ai");
            }
            let ready = if player.is_ready { "ready" } else { "not ready" };
            output.push_str(&format!(
                "  {} ({}) - {}, joined {}\n",
                player.username,
                tags.join(", "),
                ready,
                millis_to_clock_time(player.joined_at)
            ));
        }
        output.push_str(RULE);
        output
    }

    pub fn format_room_list(rooms: &[RoomSummary]) -> String {
        if rooms.is_empty() {
            return "(no rooms)".to_string();
        }
        let mut output = format!("{}\nRooms:\n", RULE);
        for room in rooms {
            let status = match room.status {
                RoomStatusDto::Waiting => "waiting",
                RoomStatusDto::Playing => "playing",
                RoomStatusDto::Finished => "finished",
            };
            let lock = if room.is_private { " [private]" } else { "" };
            output.push_str(&format!(
                "  {} \"{}\" {} {}/{} {} host {} ({}W {}L){}\n",
                room.room_id,
                room.room_name,
                room.game_type,
                room.player_count,
                room.max_players,
                status,
                room.host_username,
                room.host_stats.wins,
                room.host_stats.losses,
                lock
            ));
        }
        output.push_str(RULE);
        output
    }
}
