use crate::error::CreationError;
use crate::pipeline::context::ExecutionContext;
use crate::pipeline::step::{tracked, PipelineStep, StepKind};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::VideoVerifier;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Verifies the submitted video and downloads it for extraction.
///
/// Progress is reported under `(CAPTION, CAPTION)`: existing progress
/// consumers know this stage by that label.
pub struct VerifyStep {
    verifier: Arc<dyn VideoVerifier>,
    progress: Arc<dyn ProgressTracker>,
}

impl VerifyStep {
    pub fn new(verifier: Arc<dyn VideoVerifier>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self { verifier, progress }
    }
}

#[async_trait]
impl PipelineStep for VerifyStep {
    fn kind(&self) -> StepKind {
        StepKind::Verify
    }

    async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        let video_id = context.require_video_id(StepKind::Verify)?;

        let media = tracked(
            self.progress.as_ref(),
            context.recipe_id(),
            ProgressStep::Caption,
            ProgressDetail::Caption,
            self.verifier.verify(video_id),
        )
        .await?;

        debug!(file_uri = %media.file_uri, mime_type = %media.mime_type, "Video verified");
        Ok(context.with_file_info(media.file_uri, media.mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::progress::{InMemoryTracker, ProgressStatus};
    use crate::services::{MockServices, Operation, RecipeId, VerifiedMedia};

    fn setup() -> (Arc<MockServices>, Arc<InMemoryTracker>, VerifyStep) {
        let mock = Arc::new(MockServices::new());
        let tracker = Arc::new(InMemoryTracker::new());
        let step = VerifyStep::new(mock.clone(), tracker.clone());
        (mock, tracker, step)
    }

    #[tokio::test]
    async fn test_verify_attaches_file_info() {
        let (mock, tracker, step) = setup();
        mock.set_media(VerifiedMedia::new("s3://bucket/abc123.mp4", "video/mp4"));
        let ctx = ExecutionContext::of(RecipeId::new(), "abc123", "url", "Title");

        let out = step.run(ctx.clone()).await.unwrap();

        assert_eq!(out.file_uri(), Some("s3://bucket/abc123.mp4"));
        assert_eq!(out.mime_type(), Some("video/mp4"));
        assert_eq!(
            tracker.status(ctx.recipe_id(), ProgressStep::Caption, ProgressDetail::Caption),
            Some(ProgressStatus::Succeeded)
        );
    }

    #[tokio::test]
    async fn test_verify_failure_is_recorded_and_propagated() {
        let (mock, tracker, step) = setup();
        let error = CreationError::VerifyFailed(ServiceError::Rejected("not a recipe".into()));
        mock.fail(Operation::Verify, error.clone());
        let ctx = ExecutionContext::of(RecipeId::new(), "abc123", "url", "Title");

        let err = step.run(ctx.clone()).await.unwrap_err();

        assert_eq!(err, error);
        assert_eq!(
            tracker.status(ctx.recipe_id(), ProgressStep::Caption, ProgressDetail::Caption),
            Some(ProgressStatus::Failed)
        );
    }

    #[tokio::test]
    async fn test_verify_requires_video_id() {
        let (mock, tracker, step) = setup();
        let ctx = ExecutionContext::of(RecipeId::new(), "", "url", "Title");

        let err = step.run(ctx.clone()).await.unwrap_err();

        assert_eq!(err, CreationError::missing(StepKind::Verify, "video id"));
        assert!(tracker.records(ctx.recipe_id()).is_empty());
        assert!(mock.calls().is_empty());
    }
}
