use async_trait::async_trait;
use goishi_shared::protocol::PlayerStats;

use crate::domain::{StatsError, StatsProvider, UserId};

/// Used when no statistics service is configured
pub struct DisabledStatsProvider;

#[async_trait]
impl StatsProvider for DisabledStatsProvider {
    async fn player_stats(&self, _user_id: &UserId) -> Result<PlayerStats, StatsError> {
        Err(StatsError::Disabled)
    }
}
