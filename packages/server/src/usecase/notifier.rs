//! ServerEvent を JSON にして MessagePusher へ渡す薄いラッパー
//!
//! 送信の失敗（切断済みの接続など）はログに残すだけで、呼び出し元には返さない。
//! 状態の変更はすでに確定しているため、通知の失敗で巻き戻すことはしない。

use std::sync::Arc;

use goishi_shared::protocol::{RoomData, ServerEvent};

use crate::domain::{ConnectionId, MessagePusher, Room};

#[derive(Clone)]
pub struct Notifier {
    message_pusher: Arc<dyn MessagePusher>,
}

impl Notifier {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub fn message_pusher(&self) -> &Arc<dyn MessagePusher> {
        &self.message_pusher
    }

    fn encode(event: &ServerEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to serialize {:?}: {}", event.kind(), e);
                None
            }
        }
    }

    pub async fn send(&self, to: &ConnectionId, event: &ServerEvent) {
        let Some(json) = Self::encode(event) else {
            return;
        };
        if let Err(e) = self.message_pusher.push_to(to, &json).await {
            tracing::warn!("Failed to send {:?} to '{}': {}", event.kind(), to, e);
        }
    }

    pub async fn broadcast(&self, targets: Vec<ConnectionId>, event: &ServerEvent) {
        if targets.is_empty() {
            return;
        }
        let Some(json) = Self::encode(event) else {
            return;
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &json).await {
            tracing::warn!("Failed to broadcast {:?}: {}", event.kind(), e);
        }
    }

    /// Every human member of the room
    pub async fn broadcast_room(&self, room: &Room, event: &ServerEvent) {
        self.broadcast(room.human_ids(), event).await;
    }

    pub async fn broadcast_room_except(&self, room: &Room, except: &ConnectionId, event: &ServerEvent) {
        let targets = room
            .human_ids()
            .into_iter()
            .filter(|id| id != except)
            .collect();
        self.broadcast(targets, event).await;
    }

    /// `assigned` to each human with their own color, then `gameStart` to all
    pub async fn announce_game_start(&self, room: &Room) {
        for player in room.humans() {
            if let Some(side) = player.side {
                let assigned = ServerEvent::Assigned {
                    color: side.into(),
                    room_id: room.id.to_string(),
                };
                self.send(&player.connection_id, &assigned).await;
            }
        }
        let start = ServerEvent::GameStart {
            room_id: room.id.to_string(),
            room_data: RoomData::from(room),
        };
        self.broadcast_room(room, &start).await;
    }
}
