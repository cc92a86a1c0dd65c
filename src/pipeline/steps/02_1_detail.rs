use crate::error::CreationError;
use crate::pipeline::context::ExecutionContext;
use crate::pipeline::step::{tracked, PipelineStep, StepKind};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::{DetailExtractor, DetailMetaStore, IngredientStore, TagStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Extracts structured detail and persists it in three sub-stages:
/// ingredients, tags, then detail meta.
///
/// The extraction call belongs to the INGREDIENT sub-stage, its first
/// consumer. Each sub-stage has its own progress bracket, so a failure is
/// recorded against the sub-stage that was in flight.
pub struct DetailStep {
    details: Arc<dyn DetailExtractor>,
    ingredients: Arc<dyn IngredientStore>,
    tags: Arc<dyn TagStore>,
    detail_meta: Arc<dyn DetailMetaStore>,
    progress: Arc<dyn ProgressTracker>,
}

impl DetailStep {
    pub fn new(
        details: Arc<dyn DetailExtractor>,
        ingredients: Arc<dyn IngredientStore>,
        tags: Arc<dyn TagStore>,
        detail_meta: Arc<dyn DetailMetaStore>,
        progress: Arc<dyn ProgressTracker>,
    ) -> Self {
        Self {
            details,
            ingredients,
            tags,
            detail_meta,
            progress,
        }
    }
}

#[async_trait]
impl PipelineStep for DetailStep {
    fn kind(&self) -> StepKind {
        StepKind::Detail
    }

    async fn run(&self, context: ExecutionContext) -> Result<ExecutionContext, CreationError> {
        let media = context.require_media(StepKind::Detail)?;
        let recipe_id = context.recipe_id();
        let progress = self.progress.as_ref();

        let detail = tracked(
            progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::Ingredient,
            async {
                let detail = self
                    .details
                    .get_details(
                        context.video_id(),
                        &media.file_uri,
                        &media.mime_type,
                        context.title(),
                    )
                    .await?;
                self.ingredients
                    .create(recipe_id, &detail.ingredients)
                    .await?;
                Ok::<_, CreationError>(detail)
            },
        )
        .await?;
        debug!(count = detail.ingredients.len(), "Ingredients stored");

        tracked(
            progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::Tag,
            self.tags.create(recipe_id, &detail.tags),
        )
        .await?;
        debug!(count = detail.tags.len(), "Tags stored");

        let meta = detail.meta(context.title());
        tracked(
            progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::DetailMeta,
            self.detail_meta.create(recipe_id, &meta),
        )
        .await?;
        debug!(cook_time = meta.cook_time, servings = meta.servings, "Detail meta stored");

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::progress::{InMemoryTracker, ProgressStatus};
    use crate::services::{MockServices, Operation, RecipeId};

    fn setup() -> (Arc<MockServices>, Arc<InMemoryTracker>, DetailStep) {
        let mock = Arc::new(MockServices::new());
        let tracker = Arc::new(InMemoryTracker::new());
        let step = DetailStep::new(
            mock.clone(),
            mock.clone(),
            mock.clone(),
            mock.clone(),
            tracker.clone(),
        );
        (mock, tracker, step)
    }

    fn verified() -> ExecutionContext {
        ExecutionContext::of(RecipeId::new(), "abc123", "url", "Kimchi Jjigae")
            .with_file_info("s3://bucket/abc123.mp4", "video/mp4")
    }

    fn log(tracker: &InMemoryTracker, ctx: &ExecutionContext) -> Vec<(ProgressDetail, ProgressStatus)> {
        tracker
            .records(ctx.recipe_id())
            .into_iter()
            .map(|r| (r.detail, r.status))
            .collect()
    }

    #[tokio::test]
    async fn test_detail_runs_sub_stages_in_order() {
        let (mock, tracker, step) = setup();
        let ctx = verified();

        let out = step.run(ctx.clone()).await.unwrap();

        assert_eq!(out, ctx);
        let operations: Vec<_> = mock.calls().iter().map(|c| c.operation()).collect();
        assert_eq!(
            operations,
            vec![
                Operation::GetDetails,
                Operation::CreateIngredients,
                Operation::CreateTags,
                Operation::CreateDetailMeta,
            ]
        );
        assert_eq!(
            log(&tracker, &ctx),
            vec![
                (ProgressDetail::Ingredient, ProgressStatus::Started),
                (ProgressDetail::Ingredient, ProgressStatus::Succeeded),
                (ProgressDetail::Tag, ProgressStatus::Started),
                (ProgressDetail::Tag, ProgressStatus::Succeeded),
                (ProgressDetail::DetailMeta, ProgressStatus::Started),
                (ProgressDetail::DetailMeta, ProgressStatus::Succeeded),
            ]
        );
    }

    #[tokio::test]
    async fn test_tag_failure_stops_before_detail_meta() {
        let (mock, tracker, step) = setup();
        let error = CreationError::DetailFailed(ServiceError::Api {
            status: 500,
            message: "tag store down".into(),
        });
        mock.fail(Operation::CreateTags, error.clone());
        let ctx = verified();

        let err = step.run(ctx.clone()).await.unwrap_err();

        assert_eq!(err, error);
        assert_eq!(mock.count(Operation::CreateDetailMeta), 0);
        assert_eq!(
            log(&tracker, &ctx),
            vec![
                (ProgressDetail::Ingredient, ProgressStatus::Started),
                (ProgressDetail::Ingredient, ProgressStatus::Succeeded),
                (ProgressDetail::Tag, ProgressStatus::Started),
                (ProgressDetail::Tag, ProgressStatus::Failed),
            ]
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_is_attributed_to_ingredient() {
        let (mock, tracker, step) = setup();
        mock.fail(
            Operation::GetDetails,
            CreationError::DetailFailed(ServiceError::Timeout),
        );
        let ctx = verified();

        step.run(ctx.clone()).await.unwrap_err();

        assert_eq!(mock.count(Operation::CreateIngredients), 0);
        assert_eq!(
            tracker.status(ctx.recipe_id(), ProgressStep::Detail, ProgressDetail::Ingredient),
            Some(ProgressStatus::Failed)
        );
    }

    #[tokio::test]
    async fn test_detail_requires_file_info() {
        let (mock, tracker, step) = setup();
        let ctx = ExecutionContext::of(RecipeId::new(), "abc123", "url", "Title");

        let err = step.run(ctx.clone()).await.unwrap_err();

        assert!(matches!(
            err,
            CreationError::MissingContext {
                stage: StepKind::Detail,
                ..
            }
        ));
        assert!(tracker.records(ctx.recipe_id()).is_empty());
        assert!(mock.calls().is_empty());
    }
}
