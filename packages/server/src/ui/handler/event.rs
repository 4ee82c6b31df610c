//! Client frame dispatch.
//!
//! One inbound text frame is parsed into a `ClientFrame` and routed to its use
//! case. Failures become a reply to the sender only: `joinError` for the
//! room-entry events (quick match, create, join), `error` for everything else
//! and for a quick match that lost a race and should be retried.
//! After an action that may hand the turn to an AI seat, the AI turn is
//! scheduled here; after an action that changes the room list, the lobby is
//! refreshed.

use std::{fmt::Display, sync::Arc};

use goishi_shared::protocol::{ClientEvent, ClientFrame, ServerEvent};

use crate::{
    domain::{ConnectionId, RoomId},
    usecase::{MatchmakingError, QuickMatchOutcome},
    ui::state::AppState,
};

const MALFORMED_MESSAGE: &str = "malformed message";

pub async fn handle_frame(state: &Arc<AppState>, connection_id: &ConnectionId, text: &str) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection_id, e);
            state
                .notifier
                .send(connection_id, &ServerEvent::error(MALFORMED_MESSAGE))
                .await;
            return;
        }
    };
    let ClientFrame { game, event } = frame;
    tracing::debug!("'{}' -> {} ({})", connection_id, event.name(), game);

    match event {
        ClientEvent::QuickMatch(payload) => {
            match state.quick_match_usecase.execute(connection_id, game, payload).await {
                Ok(QuickMatchOutcome::Waiting(room_id)) => {
                    schedule_ai_fallback(state, room_id, connection_id.clone());
                }
                Ok(QuickMatchOutcome::Started(room_id)) => {
                    state.ai_turn_usecase.schedule_if_ai_turn(room_id);
                }
                Err(e) => {
                    state
                        .notifier
                        .send(connection_id, &quick_match_failure(&e))
                        .await;
                }
            }
        }
        ClientEvent::CreateRoom(payload) => {
            match state.create_room_usecase.execute(connection_id, game, payload).await {
                Ok(_) => state.room_list_usecase.publish_to_lobby().await,
                Err(e) => reply_join_error(state, connection_id, e).await,
            }
        }
        ClientEvent::JoinRoom(payload) => {
            match state.join_room_usecase.execute(connection_id, game, payload).await {
                Ok(_) => state.room_list_usecase.publish_to_lobby().await,
                Err(e) => reply_join_error(state, connection_id, e).await,
            }
        }
        ClientEvent::LeaveRoom(room) => {
            match state.leave_room_usecase.execute(connection_id, &room.room_id).await {
                Ok(_) => state.room_list_usecase.publish_to_lobby().await,
                Err(e) => reply_error(state, connection_id, e).await,
            }
        }
        ClientEvent::ToggleReady(room) => {
            if let Err(e) = state.toggle_ready_usecase.execute(connection_id, &room.room_id).await {
                reply_error(state, connection_id, e).await;
            }
        }
        ClientEvent::StartGame(room) => {
            match state.start_game_usecase.execute(connection_id, &room.room_id).await {
                Ok(room_id) => {
                    state.ai_turn_usecase.schedule_if_ai_turn(room_id);
                    state.room_list_usecase.publish_to_lobby().await;
                }
                Err(e) => reply_error(state, connection_id, e).await,
            }
        }
        ClientEvent::Move(payload) => {
            let room_id = payload.room_id.clone();
            match state.submit_move_usecase.execute(connection_id, game, payload).await {
                Ok(outcome) if outcome.result.is_over() => {
                    state.room_list_usecase.publish_to_lobby().await;
                }
                Ok(_) => schedule_ai_turn(state, &room_id),
                Err(e) => {
                    tracing::debug!("Move from '{}' rejected: {}", connection_id, e);
                    reply_error(state, connection_id, e).await;
                }
            }
        }
        ClientEvent::GameOver(payload) => {
            match state.report_game_over_usecase.execute(connection_id, payload).await {
                Ok(_) => state.room_list_usecase.publish_to_lobby().await,
                Err(e) => reply_error(state, connection_id, e).await,
            }
        }
        ClientEvent::GetRoomList => state.room_list_usecase.execute(connection_id).await,
        ClientEvent::RequestRematch(room) => {
            match state.rematch_usecase.request(connection_id, &room.room_id).await {
                Ok(true) => schedule_ai_turn(state, &room.room_id),
                Ok(false) => {}
                Err(e) => reply_error(state, connection_id, e).await,
            }
        }
        ClientEvent::AcceptRematch(room) => {
            match state.rematch_usecase.accept(connection_id, &room.room_id).await {
                Ok(()) => schedule_ai_turn(state, &room.room_id),
                Err(e) => reply_error(state, connection_id, e).await,
            }
        }
        ClientEvent::DeclineRematch(room) => {
            match state.rematch_usecase.decline(connection_id, &room.room_id).await {
                Ok(()) => state.room_list_usecase.publish_to_lobby().await,
                Err(e) => reply_error(state, connection_id, e).await,
            }
        }
    }
}

/// A lost matchmaking race asks the client to retry with a plain `error`;
/// other refusals are `joinError`
fn quick_match_failure(e: &MatchmakingError) -> ServerEvent {
    match e {
        MatchmakingError::MatchingFailed => ServerEvent::error(e.to_string()),
        _ => ServerEvent::JoinError {
            message: e.to_string(),
        },
    }
}

async fn reply_join_error(state: &AppState, connection_id: &ConnectionId, e: impl Display) {
    let event = ServerEvent::JoinError {
        message: e.to_string(),
    };
    state.notifier.send(connection_id, &event).await;
}

async fn reply_error(state: &AppState, connection_id: &ConnectionId, e: impl Display) {
    state
        .notifier
        .send(connection_id, &ServerEvent::error(e.to_string()))
        .await;
}

fn schedule_ai_turn(state: &Arc<AppState>, room_id: &str) {
    if let Ok(room_id) = RoomId::new(room_id.to_string()) {
        state.ai_turn_usecase.schedule_if_ai_turn(room_id);
    }
}

/// Seats an AI opposite a quick-match player still alone after the configured delay
fn schedule_ai_fallback(state: &Arc<AppState>, room_id: RoomId, waiting: ConnectionId) {
    let Some(delay) = state.settings.ai.quick_match_fallback else {
        return;
    };
    let state = Arc::clone(state);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match state.quick_match_usecase.fill_with_ai(&room_id, &waiting).await {
            Ok(true) => {
                state.ai_turn_usecase.schedule_if_ai_turn(room_id);
            }
            Ok(false) => {}
            Err(e) => reply_error(&state, &waiting, e).await,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AiSettings, ServerSettings},
        domain::{MessagePusher, RoomRepository},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, reasoning::DisabledReasoningBackend,
            repository::InMemoryRoomRepository, stats::DisabledStatsProvider,
        },
    };
    use goishi_shared::{
        protocol::{ServerEventKind, ServerEvent},
        time::FixedClock,
    };
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn build_state(settings: ServerSettings) -> (Arc<AppState>, Arc<dyn MessagePusher>) {
        let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
        let state = AppState::build(
            repository,
            message_pusher.clone(),
            Arc::new(DisabledReasoningBackend),
            Arc::new(DisabledStatsProvider),
            Arc::new(FixedClock::new(1_700_000_000_000)),
            settings,
        );
        (Arc::new(state), message_pusher)
    }

    async fn connect(
        message_pusher: &Arc<dyn MessagePusher>,
        name: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = ConnectionId::new(name.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        message_pusher.register_client(id.clone(), tx).await;
        (id, rx)
    }

    fn received(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            events.push(serde_json::from_str(&raw).unwrap());
        }
        events
    }

    fn no_delay() -> ServerSettings {
        ServerSettings {
            ai: AiSettings {
                think_delay: Duration::ZERO,
                ..AiSettings::default()
            },
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_gets_error() {
        // テスト項目: パースできないフレームには error{"malformed message"} を返す
        // given (前提条件):
        let (state, pusher) = build_state(no_delay());
        let (id, mut rx) = connect(&pusher, "alice").await;

        // when (操作):
        handle_frame(&state, &id, "not json").await;
        handle_frame(&state, &id, r#"{"game":"chess","event":{"type":"getRoomList"}}"#).await;

        // then (期待する結果):
        assert_eq!(
            received(&mut rx),
            vec![
                ServerEvent::error("malformed message"),
                ServerEvent::error("malformed message")
            ]
        );
    }

    #[tokio::test]
    async fn test_join_failure_is_join_error() {
        // テスト項目: 存在しない Room への参加は joinError で返る
        // given (前提条件):
        let (state, pusher) = build_state(no_delay());
        let (id, mut rx) = connect(&pusher, "alice").await;
        let frame = json!({
            "game": "renju",
            "event": {"type": "joinRoom", "payload": {"roomId": "nowhere", "username": "alice"}}
        });

        // when (操作):
        handle_frame(&state, &id, &frame.to_string()).await;

        // then (期待する結果):
        assert_eq!(
            received(&mut rx),
            vec![ServerEvent::JoinError {
                message: "room 'nowhere' not found".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_game_type_mismatch_is_rejected() {
        // テスト項目: 異なるゲーム種別の Room への参加は拒否される
        // given (前提条件):
        let (state, pusher) = build_state(no_delay());
        let (host, mut host_rx) = connect(&pusher, "host").await;
        let (guest, mut guest_rx) = connect(&pusher, "guest").await;
        let create = json!({
            "game": "renju",
            "event": {"type": "createRoom", "payload": {"roomName": "den", "username": "alice", "roomId": "den"}}
        });
        handle_frame(&state, &host, &create.to_string()).await;
        received(&mut host_rx);
        received(&mut guest_rx);
        let join = json!({
            "game": "freestyle",
            "event": {"type": "joinRoom", "payload": {"roomId": "den", "username": "bob"}}
        });

        // when (操作):
        handle_frame(&state, &guest, &join.to_string()).await;

        // then (期待する結果):
        let events = received(&mut guest_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), ServerEventKind::JoinError);
        assert!(received(&mut host_rx).is_empty());
    }

    #[tokio::test]
    async fn test_lobby_sees_new_room() {
        // テスト項目: Room が作られるとロビーの接続に roomListUpdate が届く
        // given (前提条件):
        let (state, pusher) = build_state(no_delay());
        let (host, _host_rx) = connect(&pusher, "host").await;
        let (_lobby, mut lobby_rx) = connect(&pusher, "lobby").await;
        let create = json!({
            "game": "renju",
            "event": {"type": "createRoom", "payload": {"roomName": "den", "username": "alice", "roomId": "den"}}
        });

        // when (操作):
        handle_frame(&state, &host, &create.to_string()).await;

        // then (期待する結果):
        let events = received(&mut lobby_rx);
        assert_eq!(events.len(), 1);
        let ServerEvent::RoomListUpdate { rooms } = &events[0] else {
            panic!("expected roomListUpdate, got {:?}", events[0]);
        };
        assert_eq!(rooms[0].room_id, "den");
    }

    #[tokio::test]
    async fn test_vs_ai_game_gets_ai_reply() {
        // テスト項目: AI 戦で人間が着手すると、AI の応手が届く
        // given (前提条件):
        let (state, pusher) = build_state(no_delay());
        let (host, mut rx) = connect(&pusher, "host").await;
        let frames = [
            json!({"game": "renju", "event": {"type": "createRoom", "payload": {"roomName": "den", "username": "alice", "roomId": "den", "vsAi": true}}}),
            json!({"game": "renju", "event": {"type": "toggleReady", "payload": {"roomId": "den"}}}),
            json!({"game": "renju", "event": {"type": "startGame", "payload": {"roomId": "den"}}}),
        ];
        for frame in frames {
            handle_frame(&state, &host, &frame.to_string()).await;
        }
        received(&mut rx);
        let first_move = json!({"game": "renju", "event": {"type": "move", "payload": {"roomId": "den", "row": 7, "col": 7}}});

        // when (操作):
        handle_frame(&state, &host, &first_move.to_string()).await;
        let mut moves = Vec::new();
        for _ in 0..50 {
            moves.extend(
                received(&mut rx)
                    .into_iter()
                    .filter(|e| e.kind() == ServerEventKind::Moved),
            );
            if moves.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        // then (期待する結果):
        assert_eq!(moves.len(), 2);
        let ServerEvent::Moved {
            move_number,
            socket_id,
            ..
        } = &moves[1]
        else {
            unreachable!();
        };
        assert_eq!(*move_number, 2);
        assert!(socket_id.starts_with("ai-"));
    }

    #[test]
    fn test_matching_failed_asks_for_retry() {
        // テスト項目: マッチングの競合による失敗は error{"matching failed, please retry"} で返る
        assert_eq!(
            quick_match_failure(&MatchmakingError::MatchingFailed),
            ServerEvent::error("matching failed, please retry")
        );
        assert_eq!(
            quick_match_failure(&MatchmakingError::AlreadyInRoom("den".to_string())).kind(),
            ServerEventKind::JoinError
        );
    }
}
