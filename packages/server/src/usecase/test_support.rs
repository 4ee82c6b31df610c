//! UseCase テスト用の共通セットアップ

use std::sync::Arc;

use goishi_shared::{
    protocol::{CreateRoomPayload, GameType, JoinRoomPayload, ServerEvent, ServerEventKind},
    time::FixedClock,
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessagePusher, RoleAssigners, RoomHandle, RoomId, RoomRepository},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
};

use super::notifier::Notifier;

pub struct TestHarness {
    pub repository: Arc<dyn RoomRepository>,
    pub message_pusher: Arc<dyn MessagePusher>,
    pub notifier: Notifier,
    pub clock: Arc<FixedClock>,
    pub roles: Arc<RoleAssigners>,
}

impl TestHarness {
    pub fn new() -> Self {
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
        Self {
            repository: Arc::new(InMemoryRoomRepository::new()),
            notifier: Notifier::new(message_pusher.clone()),
            message_pusher,
            clock: Arc::new(FixedClock::new(1_700_000_000_000)),
            roles: Arc::new(RoleAssigners::default()),
        }
    }

    /// Registers a connection and returns a client that records what it receives
    pub async fn connect(&self, name: &str) -> TestClient {
        let id = ConnectionId::new(name.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        self.message_pusher.register_client(id.clone(), tx).await;
        TestClient { id, rx }
    }

    pub async fn room(&self, room_id: &str) -> Option<RoomHandle> {
        self.repository
            .find_room(&RoomId::new(room_id.to_string()).unwrap())
            .await
    }
}

pub struct TestClient {
    pub id: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
}

impl TestClient {
    /// Everything received so far, decoded
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(raw) = self.rx.try_recv() {
            events.push(serde_json::from_str(&raw).unwrap());
        }
        events
    }

    pub fn kinds(&mut self) -> Vec<ServerEventKind> {
        self.drain().iter().map(ServerEvent::kind).collect()
    }
}

pub fn create_room_payload(room_id: &str, username: &str) -> CreateRoomPayload {
    CreateRoomPayload {
        room_name: format!("{}'s room", username),
        user_id: None,
        username: username.to_string(),
        is_private: false,
        password: None,
        room_id: Some(room_id.to_string()),
        vs_ai: false,
    }
}

pub fn join_room_payload(room_id: &str, username: &str) -> JoinRoomPayload {
    JoinRoomPayload {
        room_id: room_id.to_string(),
        user_id: None,
        username: username.to_string(),
        password: None,
    }
}

pub const GAME: GameType = GameType::Renju;
