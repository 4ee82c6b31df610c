use async_trait::async_trait;

use crate::domain::{ReasoningBackend, ReasoningError, ReasoningQuery, Suggestion};

/// Backend used when no reasoning service is configured
pub struct DisabledReasoningBackend;

#[async_trait]
impl ReasoningBackend for DisabledReasoningBackend {
    async fn suggest_move(&self, _query: &ReasoningQuery) -> Result<Suggestion, ReasoningError> {
        Err(ReasoningError::Disabled)
    }
}
