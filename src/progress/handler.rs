//! Progress tracker trait and progress identifiers

use crate::services::RecipeId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Coarse stage of a creation run as seen by progress consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStep {
    Ready,
    Caption,
    Detail,
    Step,
    Briefing,
    Finished,
}

/// Fine-grained sub-stage within a [`ProgressStep`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressDetail {
    Ready,
    Caption,
    Ingredient,
    Tag,
    DetailMeta,
    Step,
    Briefing,
    Finished,
}

/// Observable state of one (recipe, step, detail) key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Started,
    Succeeded,
    Failed,
}

impl ProgressStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStep::Ready => "READY",
            ProgressStep::Caption => "CAPTION",
            ProgressStep::Detail => "DETAIL",
            ProgressStep::Step => "STEP",
            ProgressStep::Briefing => "BRIEFING",
            ProgressStep::Finished => "FINISHED",
        }
    }
}

impl ProgressDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressDetail::Ready => "READY",
            ProgressDetail::Caption => "CAPTION",
            ProgressDetail::Ingredient => "INGREDIENT",
            ProgressDetail::Tag => "TAG",
            ProgressDetail::DetailMeta => "DETAIL_META",
            ProgressDetail::Step => "STEP",
            ProgressDetail::Briefing => "BRIEFING",
            ProgressDetail::Finished => "FINISHED",
        }
    }
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Started => "STARTED",
            ProgressStatus::Succeeded => "SUCCEEDED",
            ProgressStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressStatus::Started)
    }
}

impl fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProgressDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed transition in the progress log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub recipe_id: RecipeId,
    pub step: ProgressStep,
    pub detail: ProgressDetail,
    pub status: ProgressStatus,
    pub at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(
        recipe_id: RecipeId,
        step: ProgressStep,
        detail: ProgressDetail,
        status: ProgressStatus,
    ) -> Self {
        Self {
            recipe_id,
            step,
            detail,
            status,
            at: Utc::now(),
        }
    }

    pub fn key(&self) -> (ProgressStep, ProgressDetail) {
        (self.step, self.detail)
    }
}

/// Receives stage transitions of recipe creation runs.
///
/// Calls for different (step, detail) keys of the same recipe may arrive
/// concurrently. Calling `start` again for a key that already exists must
/// not lose earlier history. Implementations that persist remotely handle
/// their own failures; the pipeline never waits on a tracker error.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    async fn start(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail);

    async fn success(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail);

    async fn failed(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail);
}

/// Tracker that ignores all transitions
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTracker;

#[async_trait]
impl ProgressTracker for NoOpTracker {
    async fn start(&self, _recipe_id: RecipeId, _step: ProgressStep, _detail: ProgressDetail) {}

    async fn success(&self, _recipe_id: RecipeId, _step: ProgressStep, _detail: ProgressDetail) {}

    async fn failed(&self, _recipe_id: RecipeId, _step: ProgressStep, _detail: ProgressDetail) {}
}

/// Forwards every transition to each inner tracker, in registration order
#[derive(Default, Clone)]
pub struct CompositeTracker {
    trackers: Vec<Arc<dyn ProgressTracker>>,
}

impl CompositeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tracker: Arc<dyn ProgressTracker>) -> Self {
        self.trackers.push(tracker);
        self
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

#[async_trait]
impl ProgressTracker for CompositeTracker {
    async fn start(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        for tracker in &self.trackers {
            tracker.start(recipe_id, step, detail).await;
        }
    }

    async fn success(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        for tracker in &self.trackers {
            tracker.success(recipe_id, step, detail).await;
        }
    }

    async fn failed(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        for tracker in &self.trackers {
            tracker.failed(recipe_id, step, detail).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTracker {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProgressTracker for CountingTracker {
        async fn start(&self, _: RecipeId, _: ProgressStep, _: ProgressDetail) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        async fn success(&self, _: RecipeId, _: ProgressStep, _: ProgressDetail) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        async fn failed(&self, _: RecipeId, _: ProgressStep, _: ProgressDetail) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_noop_tracker() {
        let tracker = NoOpTracker;
        tracker
            .start(RecipeId::new(), ProgressStep::Ready, ProgressDetail::Ready)
            .await;
    }

    #[tokio::test]
    async fn test_composite_forwards_to_all() {
        let count = Arc::new(AtomicUsize::new(0));
        let composite = CompositeTracker::new()
            .with(Arc::new(CountingTracker {
                count: count.clone(),
            }))
            .with(Arc::new(CountingTracker {
                count: count.clone(),
            }));
        assert_eq!(composite.len(), 2);

        let recipe_id = RecipeId::new();
        composite
            .start(recipe_id, ProgressStep::Step, ProgressDetail::Step)
            .await;
        composite
            .failed(recipe_id, ProgressStep::Step, ProgressDetail::Step)
            .await;

        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_labels_match_wire_names() {
        assert_eq!(ProgressDetail::DetailMeta.to_string(), "DETAIL_META");
        assert_eq!(
            serde_json::to_string(&ProgressDetail::DetailMeta).unwrap(),
            "\"DETAIL_META\""
        );
        assert_eq!(
            serde_json::to_string(&ProgressStatus::Succeeded).unwrap(),
            "\"SUCCEEDED\""
        );
        assert!(ProgressStatus::Failed.is_terminal());
        assert!(!ProgressStatus::Started.is_terminal());
    }
}
