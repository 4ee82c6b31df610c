//! UseCase: 準備完了の切り替え

use std::sync::Arc;

use goishi_shared::protocol::{RoomData, ServerEvent};

use crate::domain::{ConnectionId, RoomId, RoomRepository};

use super::{error::RoomActionError, notifier::Notifier};

pub struct ToggleReadyUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
}

impl ToggleReadyUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// # Returns
    ///
    /// 切り替え後の準備状態
    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &str) -> Result<bool, RoomActionError> {
        let room_id = RoomId::new(room_id.to_string())?;
        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| RoomActionError::RoomNotFound(room_id.to_string()))?;
        let mut room = handle.lock().await;

        let ready = room.toggle_ready(connection_id)?;
        tracing::debug!("'{}' in '{}' is {}ready", connection_id, room_id, if ready { "" } else { "not " });
        let event = ServerEvent::PlayerReady {
            room_data: RoomData::from(&*room),
        };
        self.notifier.broadcast_room(&room, &event).await;
        Ok(ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomError;
    use crate::usecase::{
        create_room::CreateRoomUseCase,
        test_support::{GAME, TestHarness, create_room_payload},
    };

    #[tokio::test]
    async fn test_toggle_ready_flips_and_broadcasts() {
        // テスト項目: 準備状態が反転し、playerReady が届く
        // given (前提条件):
        let h = TestHarness::new();
        let mut alice = h.connect("alice").await;
        CreateRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone())
            .execute(&alice.id, GAME, create_room_payload("den", "alice"))
            .await
            .unwrap();
        alice.drain();
        let usecase = ToggleReadyUseCase::new(h.repository.clone(), h.notifier.clone());

        // when (操作):
        let first = usecase.execute(&alice.id, "den").await.unwrap();
        let second = usecase.execute(&alice.id, "den").await.unwrap();

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        let events = alice.drain();
        assert_eq!(events.len(), 2);
        let ServerEvent::PlayerReady { room_data } = &events[0] else {
            panic!("expected playerReady");
        };
        assert!(room_data.players[0].is_ready);
    }

    #[tokio::test]
    async fn test_toggle_ready_requires_membership() {
        // テスト項目: 参加していない Room の準備状態は変更できない
        let h = TestHarness::new();
        let alice = h.connect("alice").await;
        let bob = h.connect("bob").await;
        CreateRoomUseCase::new(h.repository.clone(), h.notifier.clone(), h.clock.clone())
            .execute(&alice.id, GAME, create_room_payload("den", "alice"))
            .await
            .unwrap();
        let usecase = ToggleReadyUseCase::new(h.repository.clone(), h.notifier.clone());
        assert_eq!(
            usecase.execute(&bob.id, "den").await,
            Err(RoomActionError::Room(RoomError::NotMember))
        );
    }
}
