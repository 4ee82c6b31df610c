//! UseCase: Room 一覧
//!
//! クイックマッチ用の Room は一覧に出さない。`getRoomList` への返信では、ホストの戦績を
//! 統計サービスから取得して付け加える（失敗・匿名ホストは 0 勝 0 敗）。
//! Room の状態が変わったときにロビー（どの Room にも入っていない接続）へ流す一覧は、
//! 統計サービスを呼ばずに送る。

use std::sync::Arc;

use futures_util::future::join_all;
use goishi_shared::protocol::{PlayerStats, RoomData, RoomSummary, ServerEvent};

use crate::{
    domain::{ConnectionId, RoomId, RoomRepository, StatsProvider, Timestamp, UserId},
    infrastructure::dto::conversion::room_summary,
};

use super::notifier::Notifier;

pub struct GetRoomListUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
    stats: Arc<dyn StatsProvider>,
}

impl GetRoomListUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier, stats: Arc<dyn StatsProvider>) -> Self {
        Self {
            repository,
            notifier,
            stats,
        }
    }

    /// 一覧に出す Room を作成順に、ホストの user_id と合わせて返す
    async fn listed(&self) -> Vec<(RoomSummary, Option<UserId>)> {
        let mut rows: Vec<(Timestamp, RoomSummary, Option<UserId>)> = Vec::new();
        for handle in self.repository.list_rooms().await {
            let room = handle.lock().await;
            if room.quick_match {
                continue;
            }
            let host_user = room.host_player().and_then(|p| p.user_id.clone());
            rows.push((room.created_at, room_summary(&room, PlayerStats::default()), host_user));
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.room_id.cmp(&b.1.room_id)));
        rows.into_iter().map(|(_, summary, user)| (summary, user)).collect()
    }

    async fn host_stats(&self, user_id: Option<UserId>) -> PlayerStats {
        let Some(user_id) = user_id else {
            return PlayerStats::default();
        };
        match self.stats.player_stats(&user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::debug!("No stats for '{}': {}", user_id, e);
                PlayerStats::default()
            }
        }
    }

    /// ホストの戦績付きの一覧
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let listed = self.listed().await;
        let lookups = listed.iter().map(|(_, user)| self.host_stats(user.clone()));
        let stats = join_all(lookups).await;
        listed
            .into_iter()
            .zip(stats)
            .map(|((mut summary, _), host_stats)| {
                summary.host_stats = host_stats;
                summary
            })
            .collect()
    }

    /// `getRoomList` への返信
    pub async fn execute(&self, connection_id: &ConnectionId) {
        let rooms = self.summaries().await;
        self.notifier
            .send(connection_id, &ServerEvent::RoomListUpdate { rooms })
            .await;
    }

    /// どの Room にも入っていない接続へ、戦績なしの一覧を送る
    pub async fn publish_to_lobby(&self) {
        let mut lobby = Vec::new();
        for connection_id in self.notifier.message_pusher().connected_clients().await {
            if self.repository.room_of(&connection_id).await.is_none() {
                lobby.push(connection_id);
            }
        }
        if lobby.is_empty() {
            return;
        }
        let rooms = self.listed().await.into_iter().map(|(summary, _)| summary).collect();
        self.notifier
            .broadcast(lobby, &ServerEvent::RoomListUpdate { rooms })
            .await;
    }

    pub async fn room_detail(&self, room_id: &str) -> Option<RoomData> {
        let room_id = RoomId::new(room_id.to_string()).ok()?;
        let handle = self.repository.find_room(&room_id).await?;
        let room = handle.lock().await;
        Some(RoomData::from(&*room))
    }
}
