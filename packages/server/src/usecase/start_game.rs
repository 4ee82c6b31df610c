//! UseCase: ホストによる対局開始
//!
//! 満員かつ全員が準備完了のときに限りホストが開始できる。
//! 色はゲーム種別ごとの割り当て戦略で決まり、各参加者に `assigned`、全員に `gameStart` が届く。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoleAssigners, RoomId, RoomRepository};

use super::{error::RoomActionError, notifier::Notifier};

pub struct StartGameUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
    roles: Arc<RoleAssigners>,
}

impl StartGameUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier, roles: Arc<RoleAssigners>) -> Self {
        Self {
            repository,
            notifier,
            roles,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &str) -> Result<RoomId, RoomActionError> {
        let room_id = RoomId::new(room_id.to_string())?;
        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| RoomActionError::RoomNotFound(room_id.to_string()))?;
        let mut room = handle.lock().await;

        let assigner = self.roles.for_game(room.game_type);
        room.start(connection_id, assigner.as_ref())?;

        tracing::info!("Game started in room '{}'", room_id);
        self.notifier.announce_game_start(&room).await;
        Ok(room_id)
    }
}
