//! UseCase: 着手
//!
//! 人間の着手と AI の着手の両方がここを通る。検証はすべて Room（と GameState）が行い、
//! 受理された着手だけが `moved` として Room 全員に届く。五連・満局の場合は続けて
//! `gameOver` が届く。拒否された着手は何も変更せず、何も送らない。
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：手番の着手が両者に届く、手数が 1 ずつ増える
//! - 異常系：手番違い・占有済み・盤外・禁手・色の詐称
//! - 終局：五連で gameOver(fiveInARow)、以降の着手は拒否

use std::sync::Arc;

use goishi_shared::protocol::{GameOverReason, GameType, MovePayload, ServerEvent};

use crate::domain::{ConnectionId, GameResult, MoveOutcome, RoomId, RoomRepository, Side};

use super::{error::MoveError, notifier::Notifier};

pub struct SubmitMoveUseCase {
    repository: Arc<dyn RoomRepository>,
    notifier: Notifier,
}

impl SubmitMoveUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        game_type: GameType,
        payload: MovePayload,
    ) -> Result<MoveOutcome, MoveError> {
        let room_id = RoomId::new(payload.room_id.clone())
            .map_err(|_| MoveError::RoomNotFound(payload.room_id.clone()))?;
        let handle = self
            .repository
            .find_room(&room_id)
            .await
            .ok_or_else(|| MoveError::RoomNotFound(room_id.to_string()))?;
        let mut room = handle.lock().await;

        if room.game_type != game_type {
            return Err(MoveError::GameTypeMismatch {
                room: room_id.to_string(),
                requested: game_type,
                actual: room.game_type,
            });
        }

        let claimed = payload.side.map(Side::from);
        let outcome = room.submit_move(connection_id, payload.row, payload.col, claimed)?;

        let moved = ServerEvent::Moved {
            row: outcome.played.coord.row,
            col: outcome.played.coord.col,
            side: outcome.played.side.into(),
            socket_id: connection_id.to_string(),
            move_number: outcome.move_number,
        };
        self.notifier.broadcast_room(&room, &moved).await;

        match outcome.result {
            GameResult::Won(winner) => {
                tracing::info!("Room '{}': {} wins by five in a row", room_id, winner);
                let over = ServerEvent::GameOver {
                    winner: Some(winner.into()),
                    reason: GameOverReason::FiveInARow,
                };
                self.notifier.broadcast_room(&room, &over).await;
            }
            GameResult::Draw => {
                tracing::info!("Room '{}': board full, draw", room_id);
                let over = ServerEvent::GameOver {
                    winner: None,
                    reason: GameOverReason::Draw,
                };
                self.notifier.broadcast_room(&room, &over).await;
            }
            _ => {}
        }

        Ok(outcome)
    }
}
