use crate::error::CreationError;
use crate::pipeline::context::ExecutionContext;
use crate::pipeline::step::{tracked, PipelineStep, StepKind};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::BriefingService;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Generates the recipe briefing and captures its caption handle.
///
/// This is the only step that contributes to the context; the caption is
/// what finalization later depends on.
pub struct BriefingStep {
    briefings: Arc<dyn BriefingService>,
    progress: Arc<dyn ProgressTracker>,
}

impl BriefingStep {
    pub fn new(briefings: Arc<dyn BriefingService>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            briefings,
            progress,
        }
    }
}

#[async_trait]
impl PipelineStep for BriefingStep {
    fn kind(&self) -> StepKind {
        StepKind::Briefing
    }

    async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        let video_id = context.require_video_id(StepKind::Briefing)?;
        let recipe_id = context.recipe_id();

        let briefing = tracked(
            self.progress.as_ref(),
            recipe_id,
            ProgressStep::Briefing,
            ProgressDetail::Briefing,
            async {
                self.briefings.create(video_id, recipe_id).await?;
                self.briefings.get(recipe_id).await
            },
        )
        .await?;

        debug!(
            caption = %briefing.caption,
            paragraphs = briefing.content.len(),
            "Briefing generated"
        );
        Ok(context.with_caption(briefing.caption))
    }
}
