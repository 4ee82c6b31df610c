//! Side assignment strategies, one per game type.

use std::{collections::HashMap, sync::Arc};

use goishi_shared::protocol::GameType;
use rand::seq::SliceRandom;

use super::board::Side;
use super::entity::Player;

/// Decides which player plays which side when a game begins
pub trait RoleAssigner: Send + Sync {
    fn assign(&self, players: &mut [Player]);
}

/// First joiner plays black
pub struct JoinOrderRoles;

impl RoleAssigner for JoinOrderRoles {
    fn assign(&self, players: &mut [Player]) {
        for (player, side) in players.iter_mut().zip(Side::ALL) {
            player.side = Some(side);
        }
    }
}

/// Sides are dealt at random
pub struct ShuffledRoles;

impl RoleAssigner for ShuffledRoles {
    fn assign(&self, players: &mut [Player]) {
        let mut sides = Side::ALL;
        sides.shuffle(&mut rand::thread_rng());
        for (player, side) in players.iter_mut().zip(sides) {
            player.side = Some(side);
        }
    }
}

/// Game type → assignment strategy
pub struct RoleAssigners {
    by_game: HashMap<GameType, Arc<dyn RoleAssigner>>,
}

impl Default for RoleAssigners {
    fn default() -> Self {
        Self::new()
            .with(GameType::Renju, Arc::new(JoinOrderRoles))
            .with(GameType::Freestyle, Arc::new(ShuffledRoles))
    }
}

impl RoleAssigners {
    pub fn new() -> Self {
        Self {
            by_game: HashMap::new(),
        }
    }

    pub fn with(mut self, game: GameType, assigner: Arc<dyn RoleAssigner>) -> Self {
        self.by_game.insert(game, assigner);
        self
    }

    /// Falls back to join order for a game type without a registered strategy
    pub fn for_game(&self, game: GameType) -> Arc<dyn RoleAssigner> {
        self.by_game
            .get(&game)
            .cloned()
            .unwrap_or_else(|| Arc::new(JoinOrderRoles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{ConnectionId, Timestamp, Username};

    fn players() -> Vec<Player> {
        ["alice", "bob"]
            .into_iter()
            .map(|name| {
                Player::human(
                    ConnectionId::new(name.to_string()).unwrap(),
                    None,
                    Username::new(name.to_string()).unwrap(),
                    Timestamp::new(0),
                )
            })
            .collect()
    }

    #[test]
    fn test_join_order_gives_first_joiner_black() {
        // テスト項目: 入室順の割り当てでは最初の参加者が黒になる
        // given (前提条件):
        let mut players = players();

        // when (操作):
        JoinOrderRoles.assign(&mut players);

        // then (期待する結果):
        assert_eq!(players[0].side, Some(Side::Black));
        assert_eq!(players[1].side, Some(Side::White));
    }

    #[test]
    fn test_shuffled_roles_assign_both_sides() {
        // テスト項目: ランダム割り当てでも黒と白が一人ずつになる
        for _ in 0..20 {
            let mut players = players();
            ShuffledRoles.assign(&mut players);
            assert_ne!(players[0].side, players[1].side);
            assert!(players.iter().all(|p| p.side.is_some()));
        }
    }

    #[test]
    fn test_registry_defaults() {
        // テスト項目: 既定の登録では renju が入室順になる
        let assigners = RoleAssigners::default();
        let mut players = players();
        assigners.for_game(GameType::Renju).assign(&mut players);
        assert_eq!(players[0].side, Some(Side::Black));
    }
}
