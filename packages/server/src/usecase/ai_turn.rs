//! UseCase: AI の手番
//!
//! 手番が AI に回ったら、思考時間だけ待ってから着手する。局面はロックの中で複製し、
//! 推論サービスへの問い合わせはロックを持たずに行う。決まった手は人間と同じ
//! `SubmitMoveUseCase` を通るため、検証も通知も人間の着手と変わらない。
//! 打てる合法手が残っていなければ、人間の投了と同じ `ReportGameOverUseCase` で投了する。
//! 対局が終わった手番の後は、ロビーへ Room 一覧を流す。
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：人間の着手の後、AI が応手し両者（人間側）に moved が届く
//! - 正常系：AI の手番でなければ何もしない
//! - 正常系：提案が拒否された場合は、拒否されたマス以外の合法手から打ち直す
//! - 正常系：AI の手で対局が終わると、ロビーに roomListUpdate が届く
//! - 境界：空きマスがすべて禁手なら AI は投了し、手番が止まらない

use std::{sync::Arc, time::Duration};

use goishi_shared::protocol::{GameOverPayload, MovePayload};
use tokio::task::JoinHandle;

use crate::domain::{
    ConnectionId, MoveOutcome, MoveRejection, ReasoningQuery, RoomId, RoomRepository, Side,
    ai::fallback_cell, detect_threats,
};

use super::{
    decide_move::DecideMoveUseCase,
    error::MoveError,
    report_game_over::{GameOverOutcome, ReportGameOverUseCase},
    room_list::GetRoomListUseCase,
    submit_move::SubmitMoveUseCase,
};

/// What the AI did with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTurn {
    Played(MoveOutcome),
    /// No legal cell was left
    Conceded { winner: Side },
}

impl AiTurn {
    pub fn ends_game(&self) -> bool {
        match self {
            AiTurn::Played(outcome) => outcome.result.is_over(),
            AiTurn::Conceded { .. } => true,
        }
    }
}

pub struct AiTurnUseCase {
    repository: Arc<dyn RoomRepository>,
    submit_move: Arc<SubmitMoveUseCase>,
    decide_move: Arc<DecideMoveUseCase>,
    report_game_over: Arc<ReportGameOverUseCase>,
    room_list: Arc<GetRoomListUseCase>,
    think_delay: Duration,
}

impl AiTurnUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        submit_move: Arc<SubmitMoveUseCase>,
        decide_move: Arc<DecideMoveUseCase>,
        report_game_over: Arc<ReportGameOverUseCase>,
        room_list: Arc<GetRoomListUseCase>,
        think_delay: Duration,
    ) -> Self {
        Self {
            repository,
            submit_move,
            decide_move,
            report_game_over,
            room_list,
            think_delay,
        }
    }

    /// 手番が AI なら、思考時間の後に着手するタスクを起動する
    pub fn schedule_if_ai_turn(self: &Arc<Self>, room_id: RoomId) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if !this.think_delay.is_zero() {
                tokio::time::sleep(this.think_delay).await;
            }
            match this.play_turn(&room_id).await {
                Ok(Some(turn)) => {
                    tracing::debug!("AI turn in room '{}': {:?}", room_id, turn);
                    if turn.ends_game() {
                        this.room_list.publish_to_lobby().await;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("AI turn in room '{}' failed: {}", room_id, e),
            }
        })
    }

    /// AI の手番であれば一手打つ（または投了する）。手番でなければ `Ok(None)`
    pub async fn play_turn(&self, room_id: &RoomId) -> Result<Option<AiTurn>, MoveError> {
        let Some(handle) = self.repository.find_room(room_id).await else {
            return Ok(None);
        };
        let snapshot = {
            let room = handle.lock().await;
            match (room.ai_to_move(), room.game()) {
                (Some(ai), Some(game)) => ai.side.map(|side| {
                    (
                        ai.connection_id.clone(),
                        room.game_type,
                        side,
                        ReasoningQuery {
                            game_type: room.game_type,
                            rules: game.rules(),
                            board: game.board().clone(),
                            side,
                            last_move: game.last_move(),
                            threats: Vec::new(),
                        },
                    )
                }),
                _ => None,
            }
        };
        let Some((ai_id, game_type, side, mut query)) = snapshot else {
            return Ok(None);
        };
        query.threats = detect_threats(&query.board, query.rules, side.opponent());

        let Some(decision) = self.decide_move.execute(&query).await else {
            return Ok(None);
        };
        tracing::info!(
            "AI ({}) chose ({}, {}) via {:?} in room '{}'",
            side,
            decision.coord.row,
            decision.coord.col,
            decision.source,
            room_id
        );

        let payload = |row: usize, col: usize| MovePayload {
            room_id: room_id.to_string(),
            row: row as i32,
            col: col as i32,
            side: Some(side.into()),
        };
        let first = self
            .submit_move
            .execute(&ai_id, game_type, payload(decision.coord.row, decision.coord.col))
            .await;
        match first {
            Ok(outcome) => Ok(Some(AiTurn::Played(outcome))),
            Err(MoveError::Rejected(
                reason @ (MoveRejection::Occupied { .. }
                | MoveRejection::OutOfBounds { .. }
                | MoveRejection::Forbidden(_)),
            )) => {
                let retry = fallback_cell(
                    &query.board,
                    query.rules,
                    side,
                    decision.coord,
                    &mut rand::thread_rng(),
                );
                let Some(coord) = retry else {
                    tracing::warn!("AI move rejected ({}) and no legal cell is left; conceding", reason);
                    return self.concede(&ai_id, room_id, side).await.map(Some);
                };
                tracing::warn!("AI move rejected ({}); playing ({}, {})", reason, coord.row, coord.col);
                self.submit_move
                    .execute(&ai_id, game_type, payload(coord.row, coord.col))
                    .await
                    .map(|outcome| Some(AiTurn::Played(outcome)))
            }
            Err(e) => Err(e),
        }
    }

    async fn concede(
        &self,
        ai_id: &ConnectionId,
        room_id: &RoomId,
        side: Side,
    ) -> Result<AiTurn, MoveError> {
        let payload = GameOverPayload {
            room_id: room_id.to_string(),
            winner: Some(side.opponent().into()),
        };
        match self.report_game_over.execute(ai_id, payload).await? {
            GameOverOutcome::Resigned { winner } => Ok(AiTurn::Conceded { winner }),
            GameOverOutcome::AlreadyOver => Err(MoveRejection::NotPlaying.into()),
        }
    }
}
