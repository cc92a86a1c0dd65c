//! In-memory progress store with per-key state tracking

use super::{ProgressDetail, ProgressRecord, ProgressStatus, ProgressStep, ProgressTracker};
use crate::services::RecipeId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

type Key = (RecipeId, ProgressStep, ProgressDetail);

#[derive(Default)]
struct TrackerState {
    log: Vec<ProgressRecord>,
    current: HashMap<Key, ProgressStatus>,
}

/// Append-only progress log kept in process memory.
///
/// Each key moves `Started -> Succeeded | Failed`. A repeated `start`
/// reopens the key and appends; a terminal call on a key that is not in
/// flight is still appended but logged as out of order.
#[derive(Default)]
pub struct InMemoryTracker {
    state: Mutex<TrackerState>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(
        &self,
        recipe_id: RecipeId,
        step: ProgressStep,
        detail: ProgressDetail,
        status: ProgressStatus,
    ) {
        let mut state = self.lock();
        let previous = state.current.insert((recipe_id, step, detail), status);

        match (previous, status) {
            (Some(ProgressStatus::Started), ProgressStatus::Started) => {
                debug!(recipe_id = %recipe_id, step = %step, detail = %detail, "Stage restarted while in flight");
            }
            (Some(ProgressStatus::Started), _) | (_, ProgressStatus::Started) => {}
            (previous, status) => {
                warn!(
                    recipe_id = %recipe_id,
                    step = %step,
                    detail = %detail,
                    previous = ?previous,
                    status = %status,
                    "Out-of-order progress transition"
                );
            }
        }

        state
            .log
            .push(ProgressRecord::new(recipe_id, step, detail, status));
    }

    /// Log entries for one recipe, in the order they were recorded
    pub fn records(&self, recipe_id: RecipeId) -> Vec<ProgressRecord> {
        self.lock()
            .log
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    /// Every log entry across all recipes
    pub fn history(&self) -> Vec<ProgressRecord> {
        self.lock().log.clone()
    }

    pub fn status(
        &self,
        recipe_id: RecipeId,
        step: ProgressStep,
        detail: ProgressDetail,
    ) -> Option<ProgressStatus> {
        self.lock().current.get(&(recipe_id, step, detail)).copied()
    }

    /// Latest status of every key of a recipe, in first-seen order
    pub fn snapshot(&self, recipe_id: RecipeId) -> ProgressSnapshot {
        let state = self.lock();
        let mut entries: Vec<ProgressEntry> = Vec::new();

        for record in state.log.iter().filter(|r| r.recipe_id == recipe_id) {
            match entries
                .iter_mut()
                .find(|e| e.step == record.step && e.detail == record.detail)
            {
                Some(entry) => {
                    entry.status = record.status;
                    entry.updated_at = record.at;
                }
                None => entries.push(ProgressEntry {
                    step: record.step,
                    detail: record.detail,
                    status: record.status,
                    updated_at: record.at,
                }),
            }
        }

        ProgressSnapshot { recipe_id, entries }
    }

    /// Drop all history of a recipe, e.g. when the recipe itself is deleted
    pub fn forget(&self, recipe_id: RecipeId) {
        let mut state = self.lock();
        state.log.retain(|r| r.recipe_id != recipe_id);
        state.current.retain(|(id, _, _), _| *id != recipe_id);
    }
}

#[async_trait]
impl ProgressTracker for InMemoryTracker {
    async fn start(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        self.transition(recipe_id, step, detail, ProgressStatus::Started);
    }

    async fn success(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        self.transition(recipe_id, step, detail, ProgressStatus::Succeeded);
    }

    async fn failed(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        self.transition(recipe_id, step, detail, ProgressStatus::Failed);
    }
}

/// Latest state of one (step, detail) key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub step: ProgressStep,
    pub detail: ProgressDetail,
    pub status: ProgressStatus,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time view of a recipe's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub recipe_id: RecipeId,
    pub entries: Vec<ProgressEntry>,
}

impl ProgressSnapshot {
    pub fn status_of(&self, step: ProgressStep, detail: ProgressDetail) -> Option<ProgressStatus> {
        self.entries
            .iter()
            .find(|e| e.step == step && e.detail == detail)
            .map(|e| e.status)
    }

    /// True once the FINISHED stage has succeeded
    pub fn is_finished(&self) -> bool {
        self.status_of(ProgressStep::Finished, ProgressDetail::Finished)
            == Some(ProgressStatus::Succeeded)
    }

    pub fn failed_keys(&self) -> Vec<(ProgressStep, ProgressDetail)> {
        self.entries
            .iter()
            .filter(|e| e.status == ProgressStatus::Failed)
            .map(|e| (e.step, e.detail))
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.status == ProgressStatus::Failed)
    }
}
