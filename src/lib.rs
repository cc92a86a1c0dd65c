//! cookbox - recipe creation pipeline for cooking videos
//!
//! A submitted video is turned into a fully populated recipe record by
//! driving remote extraction services through a fixed workflow:
//!
//! 1. **Verify** the video and download it for extraction
//! 2. **Detail**, **Instruction** and **Briefing** extraction, run concurrently
//! 3. **Finalize** the recipe once every extraction has succeeded
//!
//! The downloaded media is released once Verify has succeeded, whatever
//! happens afterwards. Every stage reports start/success/failure to a
//! [`ProgressTracker`].
//!
//! # Example Usage
//!
//! ```no_run
//! use cookbox::services::{Collaborators, HttpServiceClient, RecipeId};
//! use cookbox::{ExecutionContext, LoggingTracker, PipelineConfig, PipelineOrchestrator, VideoRef};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpServiceClient::new("http://localhost:8080")?);
//! let orchestrator = PipelineOrchestrator::new(
//!     Collaborators::from_client(client),
//!     Arc::new(LoggingTracker),
//!     PipelineConfig::default(),
//! );
//!
//! let video = VideoRef::parse("https://youtu.be/dQw4w9WgXcQ")?;
//! let context = ExecutionContext::for_video(RecipeId::new(), &video, "Kimchi Jjigae");
//! let created = orchestrator.run(context).await?;
//! println!("Briefing caption: {:?}", created.caption());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: execution context, steps, parallel group, orchestrator
//! - [`progress`]: progress identifiers and tracker implementations
//! - [`services`]: collaborator contracts, HTTP client and test double

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod services;
pub mod util;
pub mod video;

pub use config::{ConfigError, CookboxConfig};
pub use error::{CreationError, ServiceError};
pub use pipeline::{
    ExecutionContext, ParallelStepGroup, PipelineConfig, PipelineOrchestrator, PipelineStep,
    StepKind,
};
pub use progress::{
    CompositeTracker, InMemoryTracker, LoggingTracker, NoOpTracker, ProgressDetail,
    ProgressSnapshot, ProgressStatus, ProgressStep, ProgressTracker,
};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use video::{VideoRef, VideoUrlError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
