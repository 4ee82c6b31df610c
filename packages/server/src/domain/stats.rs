//! Port to the player statistics service.

use async_trait::async_trait;
use goishi_shared::protocol::PlayerStats;

use super::error::StatsError;
use super::value_object::UserId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn player_stats(&self, user_id: &UserId) -> Result<PlayerStats, StatsError>;
}
