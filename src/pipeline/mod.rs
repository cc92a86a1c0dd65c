pub mod cleanup;
pub mod config;
pub mod context;
pub mod orchestrator;
pub mod parallel;
pub mod step;
pub mod steps;

pub use cleanup::{Cleanup, CleanupGuard};
pub use config::PipelineConfig;
pub use context::{ExecutionContext, MediaFile};
pub use orchestrator::PipelineOrchestrator;
pub use parallel::ParallelStepGroup;
pub use step::{tracked, PipelineStep, StepKind};
