//! Progress tracking for recipe creation runs

mod handler;
mod logging;
mod memory;

pub use handler::{
    CompositeTracker, NoOpTracker, ProgressDetail, ProgressRecord, ProgressStatus, ProgressStep,
    ProgressTracker,
};
pub use logging::LoggingTracker;
pub use memory::{InMemoryTracker, ProgressEntry, ProgressSnapshot};
