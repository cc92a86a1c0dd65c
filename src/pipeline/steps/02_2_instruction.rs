use crate::error::CreationError;
use crate::pipeline::context::ExecutionContext;
use crate::pipeline::step::{tracked, PipelineStep, StepKind};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::InstructionExtractor;
use async_trait::async_trait;
use std::sync::Arc;

/// Extracts step-by-step instructions from the downloaded media
pub struct InstructionStep {
    instructions: Arc<dyn InstructionExtractor>,
    progress: Arc<dyn ProgressTracker>,
}

impl InstructionStep {
    pub fn new(
        instructions: Arc<dyn InstructionExtractor>,
        progress: Arc<dyn ProgressTracker>,
    ) -> Self {
        Self {
            instructions,
            progress,
        }
    }
}

#[async_trait]
impl PipelineStep for InstructionStep {
    fn kind(&self) -> StepKind {
        StepKind::Instruction
    }

    async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        let media = context.require_media(StepKind::Instruction)?;

        tracked(
            self.progress.as_ref(),
            context.recipe_id(),
            ProgressStep::Step,
            ProgressDetail::Step,
            self.instructions
                .create(context.recipe_id(), &media.file_uri, &media.mime_type),
        )
        .await?;

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::progress::{InMemoryTracker, ProgressStatus};
    use crate::services::{MockServices, Operation, RecipeId, ServiceCall};

    fn setup() -> (Arc<MockServices>, Arc<InMemoryTracker>, InstructionStep) {
        let mock = Arc::new(MockServices::new());
        let tracker = Arc::new(InMemoryTracker::new());
        let step = InstructionStep::new(mock.clone(), tracker.clone());
        (mock, tracker, step)
    }

    #[tokio::test]
    async fn test_instruction_passes_media_through() {
        let (mock, tracker, step) = setup();
        let ctx = ExecutionContext::of(RecipeId::new(), "abc123", "url", "Title")
            .with_file_info("s3://bucket/abc123.mp4", "video/mp4");

        let out = step.run(ctx.clone()).await.unwrap();

        assert_eq!(out, ctx);
        assert_eq!(
            mock.calls_to(Operation::CreateInstructions),
            vec![ServiceCall::CreateInstructions {
                recipe_id: ctx.recipe_id(),
                file_uri: "s3://bucket/abc123.mp4".to_string(),
                mime_type: "video/mp4".to_string(),
            }]
        );
        assert_eq!(
            tracker.status(ctx.recipe_id(), ProgressStep::Step, ProgressDetail::Step),
            Some(ProgressStatus::Succeeded)
        );
    }

    #[tokio::test]
    async fn test_instruction_failure() {
        let (mock, tracker, step) = setup();
        mock.fail(
            Operation::CreateInstructions,
            CreationError::InstructionFailed(ServiceError::Timeout),
        );
        let ctx = ExecutionContext::of(RecipeId::new(), "abc123", "url", "Title")
            .with_file_info("s3://bucket/abc123.mp4", "video/mp4");

        let err = step.run(ctx.clone()).await.unwrap_err();

        assert_eq!(err.stage(), StepKind::Instruction);
        assert_eq!(
            tracker.status(ctx.recipe_id(), ProgressStep::Step, ProgressDetail::Step),
            Some(ProgressStatus::Failed)
        );
    }

    #[tokio::test]
    async fn test_instruction_requires_mime_type() {
        let (mock, tracker, step) = setup();
        let ctx = ExecutionContext::of(RecipeId::new(), "abc123", "url", "Title")
            .with_file_info("s3://bucket/abc123.mp4", "  ");

        let err = step.run(ctx.clone()).await.unwrap_err();

        assert_eq!(err, CreationError::missing(StepKind::Instruction, "MIME type"));
        assert!(tracker.records(ctx.recipe_id()).is_empty());
        assert_eq!(mock.count(Operation::CreateInstructions), 0);
    }
}
