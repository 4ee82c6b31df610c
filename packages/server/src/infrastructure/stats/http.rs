//! HTTP statistics client: `GET {base}/users/{userId}/stats` → `{"wins": n, "losses": n}`

use std::time::Duration;

use async_trait::async_trait;
use goishi_shared::protocol::PlayerStats;

use crate::domain::{StatsError, StatsProvider, UserId};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct HttpStatsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatsProvider {
    pub fn new(base_url: String) -> Result<Self, StatsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StatsError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn stats_url(&self, user_id: &UserId) -> String {
        format!("{}/users/{}/stats", self.base_url, user_id)
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn player_stats(&self, user_id: &UserId) -> Result<PlayerStats, StatsError> {
        let response = self
            .client
            .get(self.stats_url(user_id))
            .send()
            .await
            .map_err(|e| StatsError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| StatsError::Request(e.to_string()))?;
        response
            .json::<PlayerStats>()
            .await
            .map_err(|e| StatsError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_url_strips_trailing_slash() {
        // テスト項目: ベース URL 末尾のスラッシュは取り除かれる
        let provider = HttpStatsProvider::new("http://stats.local/api/".to_string()).unwrap();
        let user = UserId::new("u-42".to_string()).unwrap();
        assert_eq!(provider.stats_url(&user), "http://stats.local/api/users/u-42/stats");
    }
}
