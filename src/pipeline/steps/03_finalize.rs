use crate::error::CreationError;
use crate::pipeline::context::ExecutionContext;
use crate::pipeline::step::{tracked, PipelineStep, StepKind};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::RecipeInfoService;
use async_trait::async_trait;
use std::sync::Arc;

/// Marks the recipe as created once every extraction has succeeded
pub struct FinalizeStep {
    recipe_info: Arc<dyn RecipeInfoService>,
    progress: Arc<dyn ProgressTracker>,
}

impl FinalizeStep {
    pub fn new(recipe_info: Arc<dyn RecipeInfoService>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            recipe_info,
            progress,
        }
    }
}

#[async_trait]
impl PipelineStep for FinalizeStep {
    fn kind(&self) -> StepKind {
        StepKind::Finalize
    }

    async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        context.require_caption(StepKind::Finalize)?;

        tracked(
            self.progress.as_ref(),
            context.recipe_id(),
            ProgressStep::Finished,
            ProgressDetail::Finished,
            self.recipe_info.success(context.recipe_id()),
        )
        .await?;

        Ok(context)
    }
}
