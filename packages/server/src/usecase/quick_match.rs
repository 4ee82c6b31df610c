//! UseCase: クイックマッチ
//!
//! ゲーム種別ごとに「相手を待っている Room」を最大一つだけ持つ。
//! 到着した接続はその Room に入り、二人揃った時点で待機枠を解放して対局を始める。
//! 待機枠の確認と登録は Repository の一つの排他区間で行われるため、
//! 同時に到着した二人が別々の Room を作ることはない。
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：一人目は waiting、二人目で両者に assigned + gameStart
//! - 正常系：三人目は新しい待機 Room に入る
//! - 正常系：待機中の Room に AI を座らせて開始する
//! - 異常系：すでに Room に参加している接続
//! - 異常系：ロック待ちの間に待機 Room が削除された / 埋まった（MatchingFailed、紐付けは残らない）
//! - 並行：同時に到着した二人が同じ Room で対局を始める

use std::sync::Arc;

use goishi_shared::{
    protocol::{GameType, QuickMatchPayload, ServerEvent},
    time::Clock,
};

use crate::domain::{
    ConnectionId, Player, RoleAssigners, Room, RoomHandle, RoomId, RoomIdFactory, RoomRepository,
    RoomStatus, Timestamp, UserId, Username,
};

use super::{error::MatchmakingError, notifier::Notifier};

const WAITING_MESSAGE: &str = "waiting for an opponent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickMatchOutcome {
    Waiting(RoomId),
    Started(RoomId),
}

pub struct QuickMatchUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
    roles: Arc<RoleAssigners>,
    clock: Arc<dyn Clock>,
}

impl QuickMatchUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        notifier: Notifier,
        roles: Arc<RoleAssigners>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            notifier,
            roles,
            clock,
        }
    }

    /// 待機中の Room に入る。なければ自分の Room を作って待つ
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        game_type: GameType,
        payload: QuickMatchPayload,
    ) -> Result<QuickMatchOutcome, MatchmakingError> {
        if let Some(current) = self.repository.room_of(connection_id).await {
            return Err(MatchmakingError::AlreadyInRoom(current.to_string()));
        }

        let username = match payload.username.filter(|name| !name.trim().is_empty()) {
            Some(name) => Username::new(name)?,
            None => guest_name(connection_id),
        };
        let user_id = UserId::parse_optional(payload.user_id)?;
        let now = Timestamp::new(self.clock.now_millis());
        let player = Player::human(connection_id.clone(), user_id, username, now).ready();

        // 接続は Room に座る前に紐付ける。途中で処理が打ち切られても、
        // 切断時の退室処理が紐付けから後片付けできる
        let candidate_id = RoomIdFactory::generate();
        if let Err(e) = self.repository.bind_member(connection_id, &candidate_id).await {
            tracing::warn!("Quick match binding failed: {}", e);
            return Err(MatchmakingError::MatchingFailed);
        }
        let candidate = Room::new_quick_match(candidate_id, game_type, player.clone(), now);
        let (handle, created) = self.repository.claim_matchmaking_room(candidate).await;

        let mut room = handle.lock().await;
        if !created
            && let Err(reason) = self.enter_claimed(&handle, &mut room, connection_id, player).await
        {
            tracing::warn!("Quick match into '{}' failed: {}", room.id, reason);
            self.repository.unbind_member(connection_id).await;
            return Err(MatchmakingError::MatchingFailed);
        }

        if !room.is_full() {
            tracing::info!("'{}' is waiting in quick match room '{}'", connection_id, room.id);
            let waiting = ServerEvent::Waiting {
                message: WAITING_MESSAGE.to_string(),
            };
            self.notifier.send(connection_id, &waiting).await;
            return Ok(QuickMatchOutcome::Waiting(room.id.clone()));
        }

        self.repository
            .release_matchmaking_room(game_type, &room.id)
            .await;
        if let Err(e) = room.start_matched(self.roles.for_game(game_type).as_ref()) {
            tracing::warn!("Quick match room '{}' could not start: {}", room.id, e);
            return Err(MatchmakingError::MatchingFailed);
        }
        tracing::info!("Quick match room '{}' started ({})", room.id, game_type);
        self.notifier.announce_game_start(&room).await;
        Ok(QuickMatchOutcome::Started(room.id.clone()))
    }

    /// 待機枠から取得した既存の Room に座る
    ///
    /// ロックを待つ間に Room が削除されていたら失敗とする（削除済みの Room に座ると誰とも組まれない）。
    async fn enter_claimed(
        &self,
        handle: &RoomHandle,
        room: &mut Room,
        connection_id: &ConnectionId,
        player: Player,
    ) -> Result<(), String> {
        let registered = self
            .repository
            .find_room(&room.id)
            .await
            .is_some_and(|current| Arc::ptr_eq(&current, handle));
        if !registered {
            return Err("room was closed while waiting".to_string());
        }
        self.repository.unbind_member(connection_id).await;
        self.repository
            .bind_member(connection_id, &room.id)
            .await
            .map_err(|e| e.to_string())?;
        room.add_player(player, None).map_err(|e| e.to_string())
    }

    /// まだ一人で待っていれば AI を座らせて対局を始める
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - AI 対局を開始した
    /// * `Ok(false)` - すでに相手が見つかった、または退室済み
    pub async fn fill_with_ai(
        &self,
        room_id: &RoomId,
        waiting: &ConnectionId,
    ) -> Result<bool, MatchmakingError> {
        let Some(handle) = self.repository.find_room(room_id).await else {
            return Ok(false);
        };
        let mut room = handle.lock().await;
        let still_alone = room.quick_match
            && room.players().len() == 1
            && room.is_member(waiting)
            && room.status() == RoomStatus::Waiting;
        if !still_alone {
            return Ok(false);
        }

        let game_type = room.game_type;
        self.repository
            .release_matchmaking_room(game_type, room_id)
            .await;
        let assigner = self.roles.for_game(game_type);
        let now = Timestamp::new(self.clock.now_millis());
        room.seat_ai(now)
            .and_then(|_| room.start_matched(assigner.as_ref()))
            .map_err(|e| {
                tracing::warn!("AI fallback for '{}' failed: {}", room_id, e);
                MatchmakingError::MatchingFailed
            })?;

        tracing::info!("Quick match room '{}' started against AI", room_id);
        self.notifier.announce_game_start(&room).await;
        Ok(true)
    }
}

fn guest_name(connection_id: &ConnectionId) -> Username {
    let suffix: String = connection_id.as_str().chars().take(4).collect();
    Username::new(format!("Guest-{}", suffix)).unwrap_or_else(|_| Username::ai())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use crate::usecase::{
        leave_room::LeaveRoomUseCase,
        test_support::{GAME, TestHarness},
    };
    use goishi_shared::protocol::{Color, ServerEventKind};
    use std::time::Duration;

    fn create_usecase(h: &TestHarness) -> QuickMatchUseCase {
        QuickMatchUseCase::new(
            h.repository.clone(),
            h.notifier.clone(),
            h.roles.clone(),
            h.clock.clone(),
        )
    }

    fn named(name: &str) -> QuickMatchPayload {
        QuickMatchPayload {
            username: Some(name.to_string()),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_first_arrival_waits() {
        // テスト項目: 一人目は waiting を受け取り待機する
        // given (前提条件):
        let h = TestHarness::new();
        let mut alice = h.connect("alice").await;
        let usecase = create_usecase(&h);

        // when (操作):
        let outcome = usecase.execute(&alice.id, GAME, named("alice")).await.unwrap();

        // then (期待する結果):
        assert!(matches!(outcome, QuickMatchOutcome::Waiting(_)));
        assert_eq!(alice.kinds(), vec![ServerEventKind::Waiting]);
    }

    #[tokio::test]
    async fn test_second_arrival_starts_game() {
        // テスト項目: 二人目が来ると両者に assigned と gameStart が届き、先着が黒になる
        // given (前提条件):
        let h = TestHarness::new();
        let mut alice = h.connect("alice").await;
        let mut bob = h.connect("bob").await;
        let usecase = create_usecase(&h);
        usecase.execute(&alice.id, GAME, named("alice")).await.unwrap();
        alice.drain();

        // when (操作):
        let outcome = usecase.execute(&bob.id, GAME, named("bob")).await.unwrap();

        // then (期待する結果):
        let QuickMatchOutcome::Started(room_id) = outcome else {
            panic!("expected the game to start");
        };
        let alice_events = alice.drain();
        let bob_events = bob.drain();
        assert_eq!(
            alice_events[0],
            ServerEvent::Assigned {
                color: Color::Black,
                room_id: room_id.to_string()
            }
        );
        assert_eq!(alice_events[1].kind(), ServerEventKind::GameStart);
        assert_eq!(
            bob_events[0],
            ServerEvent::Assigned {
                color: Color::White,
                room_id: room_id.to_string()
            }
        );
        assert_eq!(bob_events[1].kind(), ServerEventKind::GameStart);
    }

    #[tokio::test]
    async fn test_third_arrival_opens_new_room() {
        // テスト項目: 対局開始後に来た三人目は新しい待機 Room に入る
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let carol = h.connect("carol").await;
        let usecase = create_usecase(&h);
        usecase.execute(&alice.id, GAME, named("alice")).await.unwrap();
        let started = usecase.execute(&bob.id, GAME, named("bob")).await.unwrap();

        // when (操作):
        let outcome = usecase.execute(&carol.id, GAME, named("carol")).await.unwrap();

        // then (期待する結果):
        let (QuickMatchOutcome::Started(first), QuickMatchOutcome::Waiting(second)) = (started, outcome) else {
            panic!("unexpected outcomes");
        };
        assert_ne!(first, second);
        assert_eq!(h.repository.count_rooms().await, 2);
    }

    #[tokio::test]
    async fn test_game_types_match_separately() {
        // テスト項目: 異なるゲーム種別の待機者同士は組まれない
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let usecase = create_usecase(&h);
        usecase.execute(&alice.id, GameType::Renju, named("alice")).await.unwrap();
        let outcome = usecase.execute(&bob.id, GameType::Freestyle, named("bob")).await.unwrap();
        assert!(matches!(outcome, QuickMatchOutcome::Waiting(_)));
    }

    #[tokio::test]
    async fn test_already_in_room_is_rejected() {
        // テスト項目: すでに Room にいる接続はクイックマッチできない
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let usecase = create_usecase(&h);
        usecase.execute(&alice.id, GAME, named("alice")).await.unwrap();

        // when (操作):
        let result = usecase.execute(&alice.id, GAME, named("alice")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MatchmakingError::AlreadyInRoom(_))));
    }

    #[tokio::test]
    async fn test_anonymous_player_gets_guest_name() {
        // テスト項目: 名前のない参加者にはゲスト名が付く
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let usecase = create_usecase(&h);

        // when (操作):
        let outcome = usecase.execute(&alice.id, GAME, QuickMatchPayload::default()).await.unwrap();

        // then (期待する結果):
        let QuickMatchOutcome::Waiting(room_id) = outcome else {
            panic!("expected waiting");
        };
        let handle = h.room(room_id.as_str()).await.unwrap();
        let room = handle.lock().await;
        assert_eq!(room.players()[0].username.as_str(), "Guest-alic");
    }

    #[tokio::test]
    async fn test_concurrent_arrivals_share_one_room() {
        // テスト項目: 同時に到着した二人は同じ Room で対局を始める
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let usecase = Arc::new(create_usecase(&h));

        // when (操作):
        let (a, b) = tokio::join!(
            usecase.execute(&alice.id, GAME, named("alice")),
            usecase.execute(&bob.id, GAME, named("bob"))
        );

        // then (期待する結果):
        let outcomes = [a.unwrap(), b.unwrap()];
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, QuickMatchOutcome::Started(_)))
                .count(),
            1
        );
        assert_eq!(h.repository.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_fill_with_ai_starts_game() {
        // テスト項目: 待機中の Room に AI を座らせて対局を始められる
        // given (前提条件):
        let h = TestHarness::new();
        let mut alice = h.connect("alice").await;
        let usecase = create_usecase(&h);
        let QuickMatchOutcome::Waiting(room_id) =
            usecase.execute(&alice.id, GAME, named("alice")).await.unwrap()
        else {
            panic!("expected waiting");
        };
        alice.drain();

        // when (操作):
        let filled = usecase.fill_with_ai(&room_id, &alice.id).await.unwrap();

        // then (期待する結果):
        assert!(filled);
        assert_eq!(
            alice.kinds(),
            vec![ServerEventKind::Assigned, ServerEventKind::GameStart]
        );
        let handle = h.room(room_id.as_str()).await.unwrap();
        let room = handle.lock().await;
        assert_eq!(room.status(), RoomStatus::Playing);
        assert_eq!(room.player(&alice.id).unwrap().side, Some(Side::Black));
        assert!(room.players()[1].is_ai());
    }

    #[tokio::test]
    async fn test_fill_with_ai_after_match_is_noop() {
        // テスト項目: すでに相手が見つかっていれば AI は座らない
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let usecase = create_usecase(&h);
        let QuickMatchOutcome::Waiting(room_id) =
            usecase.execute(&alice.id, GAME, named("alice")).await.unwrap()
        else {
            panic!("expected waiting");
        };
        usecase.execute(&bob.id, GAME, named("bob")).await.unwrap();
        assert!(!usecase.fill_with_ai(&room_id, &alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_room_closed_while_waiting_for_lock() {
        // テスト項目: ロック待ちの間に待機 Room が削除されたら MatchingFailed となり、
        //             紐付けは残らず、次の到着者とは通常どおり組まれる
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        let carol = h.connect("carol").await;
        let usecase = Arc::new(create_usecase(&h));
        let leave = Arc::new(LeaveRoomUseCase::new(h.repository.clone(), h.notifier.clone()));
        let QuickMatchOutcome::Waiting(room_id) =
            usecase.execute(&alice.id, GAME, named("alice")).await.unwrap()
        else {
            panic!("expected waiting");
        };
        let handle = h.room(room_id.as_str()).await.unwrap();
        let guard = handle.lock().await;

        // when (操作): alice の退室、bob の到着の順にロック待ちに並べてから解放する
        let alice_leaves = tokio::spawn({
            let leave = leave.clone();
            let id = alice.id.clone();
            let room_id = room_id.to_string();
            async move { leave.execute(&id, &room_id).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let bob_arrives = tokio::spawn({
            let usecase = usecase.clone();
            let id = bob.id.clone();
            async move { usecase.execute(&id, GAME, named("bob")).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);
        alice_leaves.await.unwrap().unwrap();
        let bob_result = bob_arrives.await.unwrap();

        // then (期待する結果):
        assert_eq!(bob_result, Err(MatchmakingError::MatchingFailed));
        assert_eq!(h.repository.room_of(&bob.id).await, None);
        assert_eq!(h.repository.count_rooms().await, 0);
        let retry = usecase.execute(&bob.id, GAME, named("bob")).await.unwrap();
        let outcome = usecase.execute(&carol.id, GAME, named("carol")).await.unwrap();
        assert!(matches!(retry, QuickMatchOutcome::Waiting(_)));
        assert!(matches!(outcome, QuickMatchOutcome::Started(_)));
    }

    #[tokio::test]
    async fn test_room_filled_while_waiting_for_lock() {
        // テスト項目: ロック待ちの間に待機 Room が AI で埋まったら MatchingFailed となり、紐付けは残らない
        // given (前提条件):
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let mut bob = h.connect("bob").await;
        let usecase = Arc::new(create_usecase(&h));
        let QuickMatchOutcome::Waiting(room_id) =
            usecase.execute(&alice.id, GAME, named("alice")).await.unwrap()
        else {
            panic!("expected waiting");
        };
        let handle = h.room(room_id.as_str()).await.unwrap();
        let guard = handle.lock().await;

        // when (操作): AI の着席、bob の到着の順にロック待ちに並べてから解放する
        let ai_fill = tokio::spawn({
            let usecase = usecase.clone();
            let id = alice.id.clone();
            let room_id = room_id.clone();
            async move { usecase.fill_with_ai(&room_id, &id).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let bob_arrives = tokio::spawn({
            let usecase = usecase.clone();
            let id = bob.id.clone();
            async move { usecase.execute(&id, GAME, named("bob")).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);

        // then (期待する結果):
        assert!(ai_fill.await.unwrap().unwrap());
        assert_eq!(bob_arrives.await.unwrap(), Err(MatchmakingError::MatchingFailed));
        assert_eq!(h.repository.room_of(&bob.id).await, None);
        assert!(bob.drain().is_empty());
        let room = handle.lock().await;
        assert!(!room.is_member(&bob.id));
    }
}
