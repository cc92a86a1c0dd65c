use super::cleanup::{Cleanup, CleanupGuard};
use super::config::PipelineConfig;
use super::context::ExecutionContext;
use super::parallel::ParallelStepGroup;
use super::step::PipelineStep;
use super::steps::{BriefingStep, DetailStep, FinalizeStep, InstructionStep, VerifyStep};
use crate::error::CreationError;
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::Collaborators;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, Instrument};

/// Drives one recipe creation run:
/// Verify, then Detail/Instruction/Briefing in parallel, then Finalize.
///
/// Once Verify has produced a media file, cleanup of that file is
/// guaranteed on every exit path.
pub struct PipelineOrchestrator {
    progress: Arc<dyn ProgressTracker>,
    verify: VerifyStep,
    extraction: Vec<Arc<dyn PipelineStep>>,
    finalize: FinalizeStep,
    group: ParallelStepGroup,
    cleanup: Cleanup,
}

impl PipelineOrchestrator {
    pub fn new(
        collaborators: Collaborators,
        progress: Arc<dyn ProgressTracker>,
        config: PipelineConfig,
    ) -> Self {
        let extraction: Vec<Arc<dyn PipelineStep>> = vec![
            Arc::new(DetailStep::new(
                collaborators.details.clone(),
                collaborators.ingredients.clone(),
                collaborators.tags.clone(),
                collaborators.detail_meta.clone(),
                progress.clone(),
            )),
            Arc::new(InstructionStep::new(
                collaborators.instructions.clone(),
                progress.clone(),
            )),
            Arc::new(BriefingStep::new(
                collaborators.briefings.clone(),
                progress.clone(),
            )),
        ];

        Self {
            verify: VerifyStep::new(collaborators.verifier.clone(), progress.clone()),
            finalize: FinalizeStep::new(collaborators.recipe_info.clone(), progress.clone()),
            cleanup: Cleanup::new(collaborators.verifier),
            group: ParallelStepGroup::new(config.max_parallel_steps),
            extraction,
            progress,
        }
    }

    pub async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        let span = info_span!(
            "recipe_creation",
            recipe_id = %context.recipe_id(),
            video_id = %context.video_id()
        );
        self.execute(context).instrument(span).await
    }

    async fn execute(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        let start = Instant::now();
        let recipe_id = context.recipe_id();
        info!(title = %context.title(), "Starting recipe creation");

        self.progress
            .start(recipe_id, ProgressStep::Ready, ProgressDetail::Ready)
            .await;
        self.progress
            .success(recipe_id, ProgressStep::Ready, ProgressDetail::Ready)
            .await;

        let verified = match self.verify.run(context).await {
            Ok(verified) => verified,
            Err(e) => {
                error!(code = e.code(), error = %e, "Recipe creation failed");
                return Err(e);
            }
        };

        let guard = CleanupGuard::new(self.cleanup.clone(), verified.clone());
        let result = self.extract_and_finalize(&verified).await;
        guard.release().await;

        match &result {
            Ok(_) => info!(
                duration_ms = start.elapsed().as_millis() as u64,
                "Recipe creation complete"
            ),
            Err(e) => error!(
                stage = %e.stage(),
                code = e.code(),
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Recipe creation failed"
            ),
        }
        result
    }

    async fn extract_and_finalize(
        &self,
        verified: &ExecutionContext,
    ) -> Result<ExecutionContext, CreationError> {
        debug!(steps = self.extraction.len(), "Running extraction steps");
        let merged = self.group.run(verified, &self.extraction).await?;
        self.finalize.run(merged).await
    }
}
