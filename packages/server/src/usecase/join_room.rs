//! UseCase: 名前付き Room への入室

use std::sync::Arc;

use goishi_shared::{
    protocol::{GameType, JoinRoomPayload, RoomData, ServerEvent},
    time::Clock,
};

use crate::domain::{ConnectionId, Player, RoomId, RoomRepository, Timestamp, UserId, Username};

use super::{error::RoomActionError, notifier::Notifier};

pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// 入室者に `joinSuccess`、既存の参加者に `playerJoined` を送る
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        game_type: GameType,
        payload: JoinRoomPayload,
    ) -> Result<RoomId, RoomActionError> {
        if let Some(current) = self.repository.room_of(connection_id).await {
            return Err(RoomActionError::AlreadyInRoom(current.to_string()));
        }
        let room_id = RoomId::new(payload.room_id)?;
        let username = Username::new(payload.username)?;
        let user_id = UserId::parse_optional(payload.user_id)?;

        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| RoomActionError::RoomNotFound(room_id.to_string()))?;
        let mut room = handle.lock().await;
        // ロック待ちの間に最後の参加者が抜けて削除された Room には入らない
        let registered = self
            .repository
            .find_room(&room_id)
            .await
            .is_some_and(|current| Arc::ptr_eq(&current, &handle));
        if !registered {
            return Err(RoomActionError::RoomNotFound(room_id.to_string()));
        }

        if room.quick_match {
            return Err(RoomActionError::QuickMatchRoom);
        }
        if room.game_type != game_type {
            return Err(RoomActionError::GameTypeMismatch {
                room: room_id.to_string(),
                requested: game_type,
                actual: room.game_type,
            });
        }

        let now = Timestamp::new(self.clock.now_millis());
        let player = Player::human(connection_id.clone(), user_id, username, now);
        // 紐付けを先に行う。席に着いた接続は必ず切断時の退室処理から辿れる
        if let Err(e) = self.repository.bind_member(connection_id, &room_id).await {
            tracing::warn!("Join '{}' refused: {}", room_id, e);
            return Err(RoomActionError::AlreadyInRoom(room_id.to_string()));
        }
        if let Err(e) = room.add_player(player, payload.password.as_deref()) {
            self.repository.unbind_member(connection_id).await;
            return Err(e.into());
        }

        tracing::info!("'{}' joined room '{}'", connection_id, room_id);
        let room_data = RoomData::from(&*room);
        self.notifier
            .send(
                connection_id,
                &ServerEvent::JoinSuccess {
                    room_data: room_data.clone(),
                },
            )
            .await;
        self.notifier
            .broadcast_room_except(&room, connection_id, &ServerEvent::PlayerJoined { room_data })
            .await;
        Ok(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomError;
    use crate::usecase::{
        create_room::CreateRoomUseCase,
        quick_match::{QuickMatchOutcome, QuickMatchUseCase},
        test_support::{GAME, TestHarness, create_room_payload, join_room_payload},
    };
    use crate::usecase::leave_room::LeaveRoomUseCase;
    use goishi_shared::protocol::ServerEventKind;
    use std::time::Duration;

    async fn setup(h: &TestHarness, password: Option<&str>) -> JoinRoomUseCase {
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        let mut payload = create_room_payload("den", "alice");
        payload.password = password.map(str::to_string);
        CreateRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone())
            .execute(&alice, GAME, payload)
            .await
            .unwrap();
        JoinRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone())
    }

    #[tokio::test]
    async fn test_join_notifies_both_sides() {
        // テスト項目: 入室者には joinSuccess、既存の参加者には playerJoined が届く
        // given (前提条件):
        let h = TestHarness::new();
        let mut alice = h.connect("alice").await;
        let mut bob = h.connect("bob").await;
        let usecase = setup(&h, None).await;
        alice.drain();

        // when (操作):
        let result = usecase.execute(&bob.id, GAME, join_room_payload("den", "bob")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(bob.kinds(), vec![ServerEventKind::JoinSuccess]);
        assert_eq!(alice.kinds(), vec![ServerEventKind::PlayerJoined]);
    }

    #[tokio::test]
    async fn test_join_full_room_fails() {
        // テスト項目: 満員の Room には入室できない
        // given (前提条件):
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let carol = h.connect("carol").await;
        let usecase = setup(&h, None).await;
        usecase.execute(&bob.id, GAME, join_room_payload("den", "bob")).await.unwrap();

        // when (操作):
        let result = usecase.execute(&carol.id, GAME, join_room_payload("den", "carol")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomActionError::Room(RoomError::Full)));
        assert_eq!(h.repository.room_of(&carol.id).await, None);
    }

    #[tokio::test]
    async fn test_join_with_wrong_password_fails() {
        // テスト項目: パスワードが一致しなければ入室できない
        // given (前提条件):
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let usecase = setup(&h, Some("secret")).await;
        let mut payload = join_room_payload("den", "bob");
        payload.password = Some("Secret".to_string());

        // when (操作):
        let result = usecase.execute(&bob.id, GAME, payload).await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomActionError::Room(RoomError::WrongPassword)));
    }

    #[tokio::test]
    async fn test_join_unknown_room_fails() {
        // テスト項目: 存在しない Room には入室できない
        let h = TestHarness::new();
        let bob = h.connect("bob").await;
        let usecase = JoinRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone());
        let result = usecase.execute(&bob.id, GAME, join_room_payload("nowhere", "bob")).await;
        assert_eq!(result, Err(RoomActionError::RoomNotFound("nowhere".to_string())));
    }

    #[tokio::test]
    async fn test_join_with_other_game_type_fails() {
        // テスト項目: Room と異なるゲーム種別での入室は拒否される
        let h = TestHarness::new();
        let _alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let usecase = setup(&h, None).await;
        let result = usecase
            .execute(&bob.id, GameType::Freestyle, join_room_payload("den", "bob"))
            .await;
        assert!(matches!(result, Err(RoomActionError::GameTypeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_quick_match_room_cannot_be_joined() {
        // テスト項目: クイックマッチの Room には joinRoom で入れない
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let quick_match = QuickMatchUseCase::new(
            h.repository.clone(),
            h.notifier.clone(),
            h.roles.clone(),
            h.clock.clone(),
        );
        let QuickMatchOutcome::Waiting(room_id) = quick_match
            .execute(&alice.id, GAME, Default::default())
            .await
            .unwrap()
        else {
            panic!("expected waiting");
        };
        let usecase = JoinRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone());

        // when (操作):
        let result = usecase
            .execute(&bob.id, GAME, join_room_payload(room_id.as_str(), "bob"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomActionError::QuickMatchRoom));
    }

    #[tokio::test]
    async fn test_join_room_closed_while_waiting_for_lock() {
        // テスト項目: ロック待ちの間に Room が削除されたら RoomNotFound となり、紐付けは残らない
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let usecase = Arc::new(setup(&h, None).await);
        let leave = Arc::new(LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone()));
        let handle = h.room("den").await.unwrap();
        let guard = handle.lock().await;

        // when (操作): ホストの退室、bob の入室の順にロック待ちに並べてから解放する
        let host_leaves = tokio::spawn({
            let leave = leave.clone();
            let id = alice.id.clone();
            async move { leave.execute(&id, "den").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let bob_joins = tokio::spawn({
            let usecase = usecase.clone();
            let id = bob.id.clone();
            async move { usecase.execute(&id, GAME, join_room_payload("den", "bob")).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);
        host_leaves.await.unwrap().unwrap();

        // then (期待する結果):
        assert_eq!(
            bob_joins.await.unwrap(),
            Err(RoomActionError::RoomNotFound("den".to_string()))
        );
        assert_eq!(h.repository.room_of(&bob.id).await, None);
        assert_eq!(h.repository.count_rooms().await, 0);
    }
}
