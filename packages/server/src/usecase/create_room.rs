//! UseCase: 名前付き Room の作成
//!
//! 作成者がホストとして入室する。`vsAi` が指定されていれば空席に AI を座らせる。

use std::sync::Arc;

use goishi_shared::{
    protocol::{CreateRoomPayload, GameType, RoomData, ServerEvent},
    time::Clock,
};

use crate::domain::{
    ConnectionId, Password, Player, RepositoryError, Room, RoomId, RoomIdFactory, RoomName,
    RoomRepository, Timestamp, UserId, Username,
};

use super::{error::RoomActionError, notifier::Notifier};

pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// Room を作成し、作成者に `roomCreated` を返す
    ///
    /// # Returns
    ///
    /// * `Ok(RoomId)` - 作成された Room の ID
    /// * `Err(RoomActionError)` - 入力が不正、ID が使用中、または作成者がすでに別の Room にいる
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        game_type: GameType,
        payload: CreateRoomPayload,
    ) -> Result<RoomId, RoomActionError> {
        if let Some(current) = self.repository.room_of(connection_id).await {
            return Err(RoomActionError::AlreadyInRoom(current.to_string()));
        }

        let room_id = match payload.room_id {
            Some(id) => RoomId::new(id)?,
            None => RoomIdFactory::generate(),
        };
        let name = RoomName::new(payload.room_name)?;
        let username = Username::new(payload.username)?;
        let user_id = UserId::parse_optional(payload.user_id)?;
        let password = Password::parse_optional(payload.password);
        let now = Timestamp::new(self.clock.now_millis());

        let host = Player::human(connection_id.clone(), user_id, username, now);
        let mut room = Room::new(room_id.clone(), name, game_type, host, now)
            .with_password(payload.is_private, password);
        if payload.vs_ai {
            room.seat_ai(now)?;
        }
        let room_data = RoomData::from(&room);

        self.repository.insert_room(room).await.map_err(|e| match e {
            RepositoryError::DuplicateRoom(id) => RoomActionError::RoomIdTaken(id),
            RepositoryError::AlreadyBound { room, .. } => RoomActionError::AlreadyInRoom(room),
        })?;
        if let Err(e) = self.repository.bind_member(connection_id, &room_id).await {
            self.repository.remove_room(&room_id).await;
            tracing::warn!("Room '{}' rolled back: {}", room_id, e);
            return Err(RoomActionError::AlreadyInRoom(room_id.to_string()));
        }

        tracing::info!("Room '{}' ({}) created by '{}'", room_id, game_type, connection_id);
        let created = ServerEvent::RoomCreated {
            room_id: room_id.to_string(),
            room_data,
        };
        self.notifier.send(connection_id, &created).await;
        Ok(room_id)
    }
}
