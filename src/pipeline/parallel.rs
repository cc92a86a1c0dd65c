//! Concurrent fan-out of independent steps

use super::context::ExecutionContext;
use super::step::{PipelineStep, StepKind};
use crate::error::CreationError;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info_span, warn, Instrument};

/// Runs a set of independent steps against the same context and joins on
/// all of them.
///
/// Siblings are never cancelled: once submitted, every step runs to
/// completion even if another has already failed. The first failure
/// received is returned; later ones are only logged.
///
/// The permit pool belongs to the group, so concurrent runs sharing one
/// group share its bound.
pub struct ParallelStepGroup {
    max_parallel: usize,
    semaphore: Arc<Semaphore>,
}

impl ParallelStepGroup {
    pub fn new(max_parallel: usize) -> Self {
        let max_parallel = max_parallel.max(1);
        Self {
            max_parallel,
            semaphore: Arc::new(Semaphore::new(max_parallel)),
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Run `steps` concurrently, each with a clone of `context`.
    ///
    /// On success the outputs are folded back with
    /// [`ExecutionContext::merge_outputs`] in submission order.
    pub async fn run(
        &self,
        context: &ExecutionContext,
        steps: &[Arc<dyn PipelineStep>],
    ) -> Result<ExecutionContext, CreationError> {
        if steps.is_empty() {
            return Ok(context.clone());
        }

        let (tx, mut rx) = mpsc::channel(steps.len());
        let mut handles = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let step = Arc::clone(step);
            let kind = step.kind();
            let input = context.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let tx = tx.clone();
            let span = info_span!("pipeline_step", step = %kind, recipe_id = %context.recipe_id());

            let handle = tokio::spawn(
                async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    let result = step.run(input).await;
                    let _ = tx.send((index, result)).await;
                }
                .instrument(span),
            );
            handles.push((kind, handle));
        }
        drop(tx);

        let mut outputs: Vec<Option<ExecutionContext>> = vec![None; steps.len()];
        let mut first_error: Option<CreationError> = None;

        while let Some((index, result)) = rx.recv().await {
            match result {
                Ok(output) => outputs[index] = Some(output),
                Err(e) => record_failure(&mut first_error, e),
            }
        }

        // A task that panicked never sent a result
        for (kind, handle) in handles {
            if let Err(join_error) = handle.await {
                record_failure(&mut first_error, aborted(kind, &join_error));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(context.merge_outputs(outputs.iter().flatten())),
        }
    }
}

fn aborted(stage: StepKind, join_error: &tokio::task::JoinError) -> CreationError {
    let message = if join_error.is_panic() {
        "step panicked".to_string()
    } else {
        join_error.to_string()
    };
    CreationError::Aborted { stage, message }
}

fn record_failure(first: &mut Option<CreationError>, e: CreationError) {
    match first {
        None => {
            error!(stage = %e.stage(), code = e.code(), error = %e, "Parallel step failed");
            *first = Some(e);
        }
        Some(_) => warn!(
            stage = %e.stage(),
            code = e.code(),
            error = %e,
            "Additional parallel step failure"
        ),
    }
}
