//! UseCase: 再戦の申し込み・承諾・辞退
//!
//! 終局した満員の Room でのみ有効。承諾すると同じ色のまま新しい盤面で対局が始まり、
//! 辞退すると Room は待機状態に戻る（人間は未準備、AI は準備済み）。
//! 相手が AI の場合、申し込みはその場で承諾される。
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：申し込み → 承諾で rematchStart、色はそのまま
//! - 正常系：申し込み → 辞退で Room が waiting に戻る
//! - 正常系：AI 相手の申し込みは即座に承諾される
//! - 異常系：対局中の申し込み、申し込みのない承諾、二重の申し込み

use std::sync::Arc;

use goishi_shared::protocol::{RoomData, ServerEvent};

use crate::domain::{ConnectionId, RoomHandle, RoomId, RoomRepository};

use super::{error::RoomActionError, notifier::Notifier};

const AI_PARTY: &str = "AI";

pub struct RematchUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
}

impl RematchUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    async fn find(&self, room_id: &str) -> Result<(RoomId, RoomHandle), RoomActionError> {
        let room_id = RoomId::new(room_id.to_string())
            .map_err(|_| RoomActionError::RoomNotFound(room_id.to_string()))?;
        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| RoomActionError::RoomNotFound(room_id.to_string()))?;
        Ok((room_id, handle))
    }

    /// 再戦を申し込む
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 相手が AI で、そのまま新しい対局が始まった
    /// * `Ok(false)` - 相手の返事待ち
    pub async fn request(&self, connection_id: &ConnectionId, room_id: &str) -> Result<bool, RoomActionError> {
        let (room_id, handle) = self.find(room_id).await?;
        let mut room = handle.lock().await;

        room.request_rematch(connection_id)?;
        let party = party_name(room.player(connection_id).map(|p| p.username.to_string()));
        tracing::info!("'{}' requested a rematch in room '{}'", party, room_id);

        let ai_id = room
            .counterpart(connection_id)
            .filter(|p| p.is_ai())
            .map(|p| p.connection_id.clone());
        if let Some(ai_id) = ai_id {
            room.accept_rematch(&ai_id)?;
            let accepted = ServerEvent::RematchAccepted {
                party: AI_PARTY.to_string(),
            };
            self.notifier.broadcast_room(&room, &accepted).await;
            self.notifier
                .broadcast_room(&room, &ServerEvent::RematchStart { room_data: RoomData::from(&*room) })
                .await;
            return Ok(true);
        }

        let requested = ServerEvent::RematchRequested { party };
        self.notifier
            .broadcast_room_except(&room, connection_id, &requested)
            .await;
        Ok(false)
    }

    pub async fn accept(&self, connection_id: &ConnectionId, room_id: &str) -> Result<(), RoomActionError> {
        let (room_id, handle) = self.find(room_id).await?;
        let mut room = handle.lock().await;

        room.accept_rematch(connection_id)?;
        let party = party_name(room.player(connection_id).map(|p| p.username.to_string()));
        tracing::info!("'{}' accepted the rematch in room '{}'", party, room_id);

        self.notifier
            .broadcast_room(&room, &ServerEvent::RematchAccepted { party })
            .await;
        self.notifier
            .broadcast_room(&room, &ServerEvent::RematchStart { room_data: RoomData::from(&*room) })
            .await;
        Ok(())
    }

    pub async fn decline(&self, connection_id: &ConnectionId, room_id: &str) -> Result<(), RoomActionError> {
        let (room_id, handle) = self.find(room_id).await?;
        let mut room = handle.lock().await;

        room.decline_rematch(connection_id)?;
        let party = party_name(room.player(connection_id).map(|p| p.username.to_string()));
        tracing::info!("'{}' declined the rematch in room '{}'", party, room_id);

        self.notifier
            .broadcast_room(&room, &ServerEvent::RematchDeclined { party })
            .await;
        Ok(())
    }
}

fn party_name(username: Option<String>) -> String {
    username.unwrap_or_default()
}
