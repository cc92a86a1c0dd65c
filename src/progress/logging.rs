//! Logging-based progress tracker

use super::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::RecipeId;
use async_trait::async_trait;
use tracing::{info, warn};

/// Tracker that logs transitions using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTracker;

#[async_trait]
impl ProgressTracker for LoggingTracker {
    async fn start(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        info!(recipe_id = %recipe_id, step = %step, detail = %detail, "Stage started");
    }

    async fn success(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        info!(recipe_id = %recipe_id, step = %step, detail = %detail, "Stage succeeded");
    }

    async fn failed(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        warn!(recipe_id = %recipe_id, step = %step, detail = %detail, "Stage failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_all_transitions() {
        let tracker = LoggingTracker;
        let recipe_id = RecipeId::new();

        // Should not panic without a subscriber installed
        tracker
            .start(recipe_id, ProgressStep::Detail, ProgressDetail::Tag)
            .await;
        tracker
            .success(recipe_id, ProgressStep::Detail, ProgressDetail::Tag)
            .await;
        tracker
            .failed(recipe_id, ProgressStep::Detail, ProgressDetail::DetailMeta)
            .await;
    }
}
