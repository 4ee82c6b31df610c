//! UseCase: クライアントからの終局申告
//!
//! 勝敗はサーバーが盤面から判定するため、クライアントの `gameOver` は次の場合だけ受け付ける。
//!
//! - 相手の勝ちを申告した（投了）
//! - 盤面がすでに申告どおりの結果で終わっている（何もしない）
//!
//! それ以外（盤面が裏付けない自分の勝ちなど）は拒否する。

use std::sync::Arc;

use goishi_shared::protocol::{GameOverPayload, GameOverReason, ServerEvent};

use crate::domain::{ConnectionId, RoomId, RoomRepository, RoomStatus, Side};

use super::{error::MoveError, notifier::Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverOutcome {
    /// 申告者が投了し、相手の勝ちになった
    Resigned { winner: Side },
    /// 盤面がすでに同じ結果で終わっていた
    AlreadyOver,
}

pub struct ReportGameOverUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
}

impl ReportGameOverUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: GameOverPayload,
    ) -> Result<GameOverOutcome, MoveError> {
        let room_id = RoomId::new(payload.room_id.clone())
            .map_err(|_| MoveError::RoomNotFound(payload.room_id.clone()))?;
        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| MoveError::RoomNotFound(room_id.to_string()))?;
        let mut room = handle.lock().await;

        let reporter = room
            .player(connection_id)
            .ok_or(crate::domain::MoveRejection::NotMember)?;
        let claimed = payload.winner.map(Side::from);

        if room.status() == RoomStatus::Finished {
            let recorded = room.game().and_then(|g| g.result().winner());
            return if recorded == claimed {
                Ok(GameOverOutcome::AlreadyOver)
            } else {
                Err(MoveError::ResultNotConfirmed)
            };
        }

        let own_side = reporter.side;
        match (claimed, own_side) {
            (Some(winner), Some(own)) if winner == own.opponent() => {
                let winner = room.resign(connection_id)?;
                tracing::info!("Room '{}': {} resigned", room_id, winner.opponent());
                let over = ServerEvent::GameOver {
                    winner: Some(winner.into()),
                    reason: GameOverReason::Resignation,
                };
                self.notifier.broadcast_room(&room, &over).await;
                Ok(GameOverOutcome::Resigned { winner })
            }
            _ if room.status() != RoomStatus::Playing => {
                Err(crate::domain::MoveRejection::NotPlaying.into())
            }
            _ => Err(MoveError::ResultNotConfirmed),
        }
    }
}
