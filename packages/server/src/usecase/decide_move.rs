//! UseCase: AI の着手を決める
//!
//! 外部の推論サービスに局面を問い合わせ、持ち時間内に返ってきた提案を盤面と照合する。
//! 照合の順序:
//!
//! 1. 自分がその場で勝てる手があれば、提案に関係なくそれを打つ
//! 2. 提案が盤内・空点・合法であれば採用する。ただし緊急の脅威（優先度が閾値以下）が
//!    あるのに提案がそれを塞いでいない場合は、最も緊急な脅威を塞ぐ
//! 3. 提案が不正・失敗・時間切れなら、ローカルの候補（脅威を塞ぐ手、なければ合法手から無作為）
//!
//! 空点がない盤面でだけ `None` を返す。

use std::{sync::Arc, time::Duration};

use crate::domain::{
    Coord, ReasoningBackend, ReasoningQuery,
    ai::{immediate_win, local_candidate, top_blocking_cell},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    OwnWin,
    External,
    ThreatOverride,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub coord: Coord,
    pub source: DecisionSource,
}

pub struct DecideMoveUseCase {
    backend: Arc<dyn ReasoningBackend>,
    budget: Duration,
    urgency_threshold: u8,
}

impl DecideMoveUseCase {
    pub fn new(backend: Arc<dyn ReasoningBackend>, budget: Duration, urgency_threshold: u8) -> Self {
        Self {
            backend,
            budget,
            urgency_threshold,
        }
    }

    pub async fn execute(&self, query: &ReasoningQuery) -> Option<Decision> {
        let ReasoningQuery {
            board, rules, side, ..
        } = query;
        if board.is_full() {
            return None;
        }
        if let Some(coord) = immediate_win(board, *rules, *side) {
            return Some(Decision {
                coord,
                source: DecisionSource::OwnWin,
            });
        }

        let local = local_candidate(board, *rules, *side, &query.threats, &mut rand::thread_rng());
        let local = local.map(|coord| Decision {
            coord,
            source: DecisionSource::Local,
        });

        let suggestion = match tokio::time::timeout(self.budget, self.backend.suggest_move(query)).await {
            Ok(Ok(suggestion)) => suggestion,
            Ok(Err(e)) => {
                tracing::debug!("Reasoning backend unavailable: {}", e);
                return local;
            }
            Err(_) => {
                tracing::warn!("Reasoning backend exceeded {:?}", self.budget);
                return local;
            }
        };

        let coord = match Coord::from_signed(suggestion.row, suggestion.col) {
            Ok(coord) if board.is_empty(coord) && rules.is_legal(board, coord, *side) => coord,
            _ => {
                tracing::warn!(
                    "Discarding unusable suggestion ({}, {})",
                    suggestion.row,
                    suggestion.col
                );
                return local;
            }
        };

        let urgent: Vec<_> = query
            .threats
            .iter()
            .filter(|t| t.priority() <= self.urgency_threshold)
            .copied()
            .collect();
        if !urgent.is_empty()
            && !urgent.iter().any(|t| t.coord == coord)
            && let Some(block) = top_blocking_cell(board, *rules, *side, &urgent)
        {
            tracing::info!(
                "Suggestion ({}, {}) ignores a {} threat; blocking ({}, {})",
                coord.row,
                coord.col,
                urgent[0].kind.as_str(),
                block.row,
                block.col
            );
            return Some(Decision {
                coord: block,
                source: DecisionSource::ThreatOverride,
            });
        }

        Some(Decision {
            coord,
            source: DecisionSource::External,
        })
    }
}
