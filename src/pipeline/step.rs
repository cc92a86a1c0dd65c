use super::context::ExecutionContext;
use crate::error::CreationError;
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::RecipeId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Stages of a recipe creation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Verify,
    Detail,
    Instruction,
    Briefing,
    Finalize,
    Cleanup,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Verify => "verify",
            StepKind::Detail => "detail",
            StepKind::Instruction => "instruction",
            StepKind::Briefing => "briefing",
            StepKind::Finalize => "finalize",
            StepKind::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bracketed stage of recipe creation.
///
/// Implementations check their preconditions before touching the progress
/// tracker, then run their collaborator calls inside [`tracked`] so that
/// every started key ends in exactly one of success or failure.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    fn kind(&self) -> StepKind;

    async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError>;
}

/// Bracket `work` with start/success/failed progress calls for one key.
///
/// The error from `work` is returned as-is.
pub async fn tracked<T, F>(
    progress: &dyn ProgressTracker,
    recipe_id: RecipeId,
    step: ProgressStep,
    detail: ProgressDetail,
    work: F,
) -> Result<T, CreationError>
where
    F: Future<Output = Result<T, CreationError>> + Send,
{
    progress.start(recipe_id, step, detail).await;
    match work.await {
        Ok(value) => {
            progress.success(recipe_id, step, detail).await;
            Ok(value)
        }
        Err(err) => {
            progress.failed(recipe_id, step, detail).await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::progress::{InMemoryTracker, ProgressStatus};

    #[test]
    fn test_step_kind_display() {
        assert_eq!(StepKind::Verify.to_string(), "verify");
        assert_eq!(StepKind::Instruction.to_string(), "instruction");
        assert_eq!(
            serde_json::to_string(&StepKind::Finalize).unwrap(),
            "\"finalize\""
        );
    }

    #[tokio::test]
    async fn test_tracked_records_success() {
        let tracker = InMemoryTracker::new();
        let recipe_id = RecipeId::new();

        let value = tracked(
            &tracker,
            recipe_id,
            ProgressStep::Step,
            ProgressDetail::Step,
            async { Ok::<_, CreationError>(42) },
        )
        .await
        .unwrap();

        assert_eq!(value, 42);
        let statuses: Vec<_> = tracker
            .records(recipe_id)
            .into_iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(
            statuses,
            vec![ProgressStatus::Started, ProgressStatus::Succeeded]
        );
    }

    #[tokio::test]
    async fn test_tracked_records_failure_and_returns_original_error() {
        let tracker = InMemoryTracker::new();
        let recipe_id = RecipeId::new();
        let original = CreationError::InstructionFailed(ServiceError::Timeout);

        let err = tracked(
            &tracker,
            recipe_id,
            ProgressStep::Step,
            ProgressDetail::Step,
            async { Err::<(), _>(original.clone()) },
        )
        .await
        .unwrap_err();

        assert_eq!(err, original);
        let records = tracker.records(recipe_id);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status, ProgressStatus::Failed);
    }
}
