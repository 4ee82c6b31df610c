//! Server settings assembled by the binary from command-line arguments.

use std::time::Duration;

pub const DEFAULT_THINK_DELAY: Duration = Duration::from_millis(600);
pub const DEFAULT_DECISION_BUDGET: Duration = Duration::from_secs(8);
/// Threats at or above this urgency (five, open four) override external suggestions
pub const DEFAULT_URGENCY_THRESHOLD: u8 = 2;

#[derive(Debug, Clone)]
pub struct AiSettings {
    /// Pause before an AI seat submits its move
    pub think_delay: Duration,
    /// How long the external reasoning backend may take
    pub decision_budget: Duration,
    pub urgency_threshold: u8,
    /// Pair a lone quick-match player with an AI after this long
    pub quick_match_fallback: Option<Duration>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            think_delay: DEFAULT_THINK_DELAY,
            decision_budget: DEFAULT_DECISION_BUDGET,
            urgency_threshold: DEFAULT_URGENCY_THRESHOLD,
            quick_match_fallback: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    pub ai: AiSettings,
}
