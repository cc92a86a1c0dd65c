//! Best-effort release of downloaded media

use super::context::ExecutionContext;
use crate::services::VideoVerifier;
use std::sync::Arc;
use tracing::{debug, warn};

/// Deletes the media file a run downloaded, if any.
///
/// Failures are logged and swallowed so they never mask the outcome of
/// the run itself.
#[derive(Clone)]
pub struct Cleanup {
    verifier: Arc<dyn VideoVerifier>,
}

impl Cleanup {
    pub fn new(verifier: Arc<dyn VideoVerifier>) -> Self {
        Self { verifier }
    }

    pub async fn run(&self, context: Option<&ExecutionContext>) {
        let Some(context) = context else {
            debug!("No execution context, nothing to clean up");
            return;
        };
        let Some(file_uri) = context.file_uri().filter(|uri| !uri.trim().is_empty()) else {
            debug!(recipe_id = %context.recipe_id(), "No downloaded media, nothing to clean up");
            return;
        };

        match self.verifier.cleanup(file_uri).await {
            Ok(()) => debug!(recipe_id = %context.recipe_id(), file_uri, "Media cleaned up"),
            Err(e) => warn!(
                recipe_id = %context.recipe_id(),
                file_uri,
                error = %e,
                "Media cleanup failed"
            ),
        }
    }
}

/// Owns the verified context until cleanup has run.
///
/// Call [`CleanupGuard::release`] on every normal exit. If the guard is
/// dropped without being released (the run future was cancelled or a step
/// panicked), cleanup is spawned onto the current runtime instead. Either
/// way it runs at most once.
pub struct CleanupGuard {
    cleanup: Cleanup,
    context: Option<ExecutionContext>,
}

impl CleanupGuard {
    pub fn new(cleanup: Cleanup, context: ExecutionContext) -> Self {
        Self {
            cleanup,
            context: Some(context),
        }
    }

    pub async fn release(mut self) {
        if let Some(context) = self.context.take() {
            self.cleanup.run(Some(&context)).await;
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let cleanup = self.cleanup.clone();
                handle.spawn(async move {
                    cleanup.run(Some(&context)).await;
                });
            }
            Err(_) => warn!(
                recipe_id = %context.recipe_id(),
                "Cleanup guard dropped outside a runtime, media left in place"
            ),
        }
    }
}
