//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! Room 本体・接続の所属・クイックマッチの待機枠を一つの Mutex で守るため、
//! 索引同士が食い違うことはありません。Room の中身はそれぞれの `RoomHandle` が守ります。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use goishi_shared::protocol::GameType;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RepositoryError, Room, RoomHandle, RoomId, RoomRepository};

#[derive(Default)]
struct Registry {
    rooms: HashMap<RoomId, RoomHandle>,
    members: HashMap<ConnectionId, RoomId>,
    matchmaking: HashMap<GameType, RoomId>,
}

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    registry: Mutex<Registry>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert_room(&self, room: Room) -> Result<RoomHandle, RepositoryError> {
        let mut registry = self.registry.lock().await;
        if registry.rooms.contains_key(&room.id) {
            return Err(RepositoryError::DuplicateRoom(room.id.into_string()));
        }
        let room_id = room.id.clone();
        let handle = Arc::new(Mutex::new(room));
        registry.rooms.insert(room_id.clone(), handle.clone());
        tracing::debug!("Room '{}' registered", room_id);
        Ok(handle)
    }

    async fn find_room(&self, room_id: &RoomId) -> Option<RoomHandle> {
        let registry = self.registry.lock().await;
        registry.rooms.get(room_id).cloned()
    }

    async fn remove_room(&self, room_id: &RoomId) -> Option<RoomHandle> {
        let mut registry = self.registry.lock().await;
        let removed = registry.rooms.remove(room_id);
        registry.members.retain(|_, joined| joined != room_id);
        registry.matchmaking.retain(|_, waiting| waiting != room_id);
        if removed.is_some() {
            tracing::debug!("Room '{}' removed", room_id);
        }
        removed
    }

    async fn list_rooms(&self) -> Vec<RoomHandle> {
        let registry = self.registry.lock().await;
        registry.rooms.values().cloned().collect()
    }

    async fn count_rooms(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.rooms.len()
    }

    async fn claim_matchmaking_room(&self, candidate: Room) -> (RoomHandle, bool) {
        let mut registry = self.registry.lock().await;
        let game_type = candidate.game_type;

        if let Some(waiting) = registry.matchmaking.get(&game_type).cloned() {
            if let Some(handle) = registry.rooms.get(&waiting) {
                return (handle.clone(), false);
            }
            // 待機枠が削除済みの Room を指していた
            registry.matchmaking.remove(&game_type);
        }

        let room_id = candidate.id.clone();
        let handle = Arc::new(Mutex::new(candidate));
        registry.rooms.insert(room_id.clone(), handle.clone());
        registry.matchmaking.insert(game_type, room_id.clone());
        tracing::debug!("Quick match room '{}' is waiting for {}", room_id, game_type);
        (handle, true)
    }

    async fn release_matchmaking_room(&self, game_type: GameType, room_id: &RoomId) {
        let mut registry = self.registry.lock().await;
        if registry.matchmaking.get(&game_type) == Some(room_id) {
            registry.matchmaking.remove(&game_type);
        }
    }

    async fn bind_member(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RepositoryError> {
        let mut registry = self.registry.lock().await;
        match registry.members.get(connection_id) {
            Some(current) if current != room_id => Err(RepositoryError::AlreadyBound {
                connection: connection_id.to_string(),
                room: current.to_string(),
            }),
            _ => {
                registry
                    .members
                    .insert(connection_id.clone(), room_id.clone());
                Ok(())
            }
        }
    }

    async fn unbind_member(&self, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;
        registry.members.remove(connection_id);
    }

    async fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let registry = self.registry.lock().await;
        registry.members.get(connection_id).cloned()
    }
}
