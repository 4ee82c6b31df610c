//! UseCase: 退室処理
//!
//! 明示的な `leaveRoom` と、切断時の後片付けの両方から呼ばれる。
//!
//! 退室時の振る舞い:
//! - 対局中なら対局は中断され、残った参加者に `gameAborted` が一度だけ届く
//! - 残った参加者には必ず `playerLeft` が届く
//! - ホストが抜けたら残った人間の参加者に引き継ぎ、`hostChanged` を送る
//! - 人間が一人もいなくなった Room は削除され、待機枠も解放される

use std::sync::Arc;

use goishi_shared::protocol::{RoomData, ServerEvent};

use crate::domain::{ConnectionId, RoomId, RoomRepository};

use super::{error::RoomActionError, notifier::Notifier};

const ABORT_REASON: &str = "opponent left";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room_id: RoomId,
    pub aborted: bool,
    pub room_closed: bool,
    pub new_host: Option<ConnectionId>,
}

pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// 指定した Room から退室する
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
    ) -> Result<LeaveOutcome, RoomActionError> {
        let room_id = RoomId::new(room_id.to_string())?;
        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| RoomActionError::RoomNotFound(room_id.to_string()))?;

        let mut room = handle.lock().await;
        let departure = room.remove_player(connection_id)?;
        self.repository.unbind_member(connection_id).await;

        if departure.is_empty {
            self.repository.remove_room(&room_id).await;
            tracing::info!("Room '{}' closed: no players left", room_id);
        } else {
            if departure.aborted {
                let aborted = ServerEvent::GameAborted {
                    reason: ABORT_REASON.to_string(),
                    leaving_player: departure.player.username.to_string(),
                };
                self.notifier.broadcast_room(&room, &aborted).await;
            }
            let left = ServerEvent::PlayerLeft {
                room_data: RoomData::from(&*room),
                username: departure.player.username.to_string(),
            };
            self.notifier.broadcast_room(&room, &left).await;
            if departure.new_host.is_some() {
                let host_changed = ServerEvent::HostChanged {
                    room_data: RoomData::from(&*room),
                };
                self.notifier.broadcast_room(&room, &host_changed).await;
            }
        }

        tracing::info!(
            "'{}' left room '{}'{}",
            departure.player.username,
            room_id,
            if departure.aborted { " (game aborted)" } else { "" }
        );

        Ok(LeaveOutcome {
            room_id,
            aborted: departure.aborted,
            room_closed: departure.is_empty,
            new_host: departure.new_host,
        })
    }

    /// 接続が参加中の Room があれば退室する（切断時）
    pub async fn leave_current(&self, connection_id: &ConnectionId) -> Option<LeaveOutcome> {
        let room_id = self.repository.room_of(connection_id).await?;
        match self.execute(connection_id, room_id.as_str()).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("'{}' could not leave '{}': {}", connection_id, room_id, e);
                self.repository.unbind_member(connection_id).await;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomError;
    use crate::usecase::{
        create_room::CreateRoomUseCase,
        join_room::JoinRoomUseCase,
        start_game::StartGameUseCase,
        test_support::{GAME, TestHarness, create_room_payload, join_room_payload},
        toggle_ready::ToggleReadyUseCase,
    };
    use goishi_shared::protocol::ServerEventKind;

    async fn setup_room(h: &TestHarness) {
        let create = CreateRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone());
        let join = JoinRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone());
        create
            .execute(&conn("alice"), GAME, create_room_payload("den", "alice"))
            .await
            .unwrap();
        join.execute(&conn("bob"), GAME, join_room_payload("den", "bob"))
            .await
            .unwrap();
    }

    async fn start(h: &TestHarness) {
        let ready = ToggleReadyUseCase::new(h.repository.clone(), h.notifier.clone());
        let start = StartGameUseCase::new(h.repository.clone(), h.notifier.clone(), h.roles.clone());
        ready.execute(&conn("alice"), "den").await.unwrap();
        ready.execute(&conn("bob"), "den").await.unwrap();
        start.execute(&conn("alice"), "den").await.unwrap();
    }

    fn conn(name: &str) -> ConnectionId {
        ConnectionId::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_host_leaving_waiting_room_promotes_next_player() {
        // テスト項目: ホストが退室すると残った参加者がホストになる
        // given (前提条件):
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let mut bob = h.connect("bob").await;
        setup_room(&h).await;
        bob.drain();
        let usecase = LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone());

        // when (操作):
        let outcome = usecase.execute(&conn("alice"), "den").await.unwrap();

        // then (期待する結果):
        assert!(!outcome.aborted);
        assert!(!outcome.room_closed);
        assert_eq!(outcome.new_host, Some(conn("bob")));
        assert_eq!(
            bob.kinds(),
            vec![ServerEventKind::PlayerLeft, ServerEventKind::HostChanged]
        );
        assert_eq!(h.repository.room_of(&conn("alice")).await, None);
    }

    #[tokio::test]
    async fn test_leaving_mid_game_broadcasts_abort_once() {
        // テスト項目: 対局中の退室では残った参加者に gameAborted が一度だけ届く
        // given (前提条件):
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let mut bob = h.connect("bob").await;
        setup_room(&h).await;
        start(&h).await;
        bob.drain();
        let usecase = LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone());

        // when (操作):
        let outcome = usecase.execute(&conn("alice"), "den").await.unwrap();

        // then (期待する結果):
        assert!(outcome.aborted);
        let events = bob.drain();
        let aborted: Vec<_> = events
            .iter()
            .filter(|e| e.kind() == ServerEventKind::GameAborted)
            .collect();
        assert_eq!(aborted.len(), 1);
        assert_eq!(
            aborted[0],
            &ServerEvent::GameAborted {
                reason: "opponent left".to_string(),
                leaving_player: "alice".to_string()
            }
        );
        assert!(events.iter().any(|e| e.kind() == ServerEventKind::PlayerLeft));
    }

    #[tokio::test]
    async fn test_last_player_leaving_closes_room() {
        // テスト項目: 最後の参加者が退室すると Room は削除される
        // given (前提条件):
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let _bob = h.connect("bob").await;
        setup_room(&h).await;
        let usecase = LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone());

        // when (操作):
        usecase.execute(&conn("alice"), "den").await.unwrap();
        let outcome = usecase.execute(&conn("bob"), "den").await.unwrap();

        // then (期待する結果):
        assert!(outcome.room_closed);
        assert!(h.room("den").await.is_none());
    }

    #[tokio::test]
    async fn test_leaving_room_not_joined_fails() {
        // テスト項目: 参加していない Room からは退室できない
        // given (前提条件):
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let _bob = h.connect("bob").await;
        let create = CreateRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone());
        create
            .execute(&conn("alice"), GAME, create_room_payload("den", "alice"))
            .await
            .unwrap();
        let usecase = LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone());

        // when (操作):
        let not_member = usecase.execute(&conn("bob"), "den").await;
        let missing = usecase.execute(&conn("bob"), "nowhere").await;

        // then (期待する結果):
        assert_eq!(not_member, Err(RoomActionError::Room(RoomError::NotMember)));
        assert_eq!(missing, Err(RoomActionError::RoomNotFound("nowhere".to_string())));
    }

    #[tokio::test]
    async fn test_leave_current_without_room_is_noop() {
        // テスト項目: どの Room にも参加していなければ何もしない
        let h = TestHarness::new();
        let usecase = LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone());
        assert_eq!(usecase.leave_current(&conn("alice")).await, None);
    }
}
