//! Command handlers; each returns the process exit code

use super::commands::{ConfigArgs, CreateArgs, HealthArgs};
use super::output::{
    CreationOutcome, CreationReport, FailureReport, HealthStatus, OutputFormat, OutputFormatter,
};
use crate::config::CookboxConfig;
use crate::pipeline::{ExecutionContext, PipelineOrchestrator};
use crate::progress::{CompositeTracker, InMemoryTracker, LoggingTracker, ProgressTracker};
use crate::services::{Collaborators, HttpProgressTracker, RecipeId};
use crate::video::VideoRef;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_INPUT: i32 = 2;

pub async fn handle_create(args: &CreateArgs, quiet: bool) -> i32 {
    info!("Starting recipe creation");

    let video = match VideoRef::parse_or_id(&args.url) {
        Ok(video) => video,
        Err(e) => {
            error!("{}", e);
            return EXIT_INVALID_INPUT;
        }
    };
    if args.title.trim().is_empty() {
        error!("Recipe title must not be empty");
        return EXIT_INVALID_INPUT;
    }

    let config = CookboxConfig::default();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return EXIT_INVALID_INPUT;
    }
    debug!("Using configuration: {:?}", config);

    let client = match config.create_client() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("{}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let memory = Arc::new(InMemoryTracker::new());
    let mut tracker = CompositeTracker::new()
        .with(Arc::new(LoggingTracker))
        .with(memory.clone());
    if config.report_progress {
        tracker = tracker.with(Arc::new(HttpProgressTracker::new(client.clone())));
    }

    let orchestrator = PipelineOrchestrator::new(
        Collaborators::from_client(client),
        Arc::new(tracker) as Arc<dyn ProgressTracker>,
        config.pipeline_config(),
    );

    let recipe_id = args.recipe_id.unwrap_or_default();
    let context = ExecutionContext::for_video(recipe_id, &video, args.title.trim());
    let report = run_creation(&orchestrator, &memory, context).await;

    print_report(&report, args.format.into(), quiet)
}

/// Run the pipeline once and summarise it, including the progress recorded
/// by `memory` for this recipe
pub async fn run_creation(
    orchestrator: &PipelineOrchestrator,
    memory: &InMemoryTracker,
    context: ExecutionContext,
) -> CreationReport {
    let start = Instant::now();
    let recipe_id: RecipeId = context.recipe_id();
    let video_id = context.video_id().to_string();
    let title = context.title().to_string();

    let result = orchestrator.run(context).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let (outcome, caption, failure) = match &result {
        Ok(done) => (
            CreationOutcome::Succeeded,
            done.caption().map(|c| c.as_str().to_string()),
            None,
        ),
        Err(e) => (CreationOutcome::Failed, None, Some(FailureReport::from(e))),
    };

    CreationReport {
        recipe_id: recipe_id.to_string(),
        video_id,
        title,
        outcome,
        caption,
        failure,
        duration_ms,
        progress: memory.snapshot(recipe_id),
    }
}

fn print_report(report: &CreationReport, format: OutputFormat, quiet: bool) -> i32 {
    let exit_code = if report.succeeded() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    };
    if quiet && format == OutputFormat::Human {
        return exit_code;
    }

    match OutputFormatter::new(format).format_creation(report) {
        Ok(output) => {
            println!("{}", output);
            exit_code
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            EXIT_FAILURE
        }
    }
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    info!("Checking extraction service health");

    let config = CookboxConfig::default();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return EXIT_INVALID_INPUT;
    }

    let status = match config.create_client() {
        Ok(client) => match client.health_check().await {
            Ok(true) => HealthStatus::available(format!("Connected to {}", client.base_url())),
            Ok(false) => {
                warn!("Extraction service is not available at {}", client.base_url());
                HealthStatus::unavailable(format!("Cannot connect to {}", client.base_url()))
                    .with_details("Set COOKBOX_SERVICE_URL to a running service".to_string())
            }
            Err(e) => HealthStatus::unavailable(format!("Health check failed: {}", e)),
        },
        Err(e) => HealthStatus::unavailable(e.to_string()),
    };

    let available = status.available;
    let mut health_results = HashMap::new();
    health_results.insert("extraction-service".to_string(), status);

    match OutputFormatter::new(args.format.into()).format_health(&health_results) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Failed to format output: {}", e);
            return EXIT_FAILURE;
        }
    }

    if available {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = CookboxConfig::default();

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Failed to format output: {}", e);
            return EXIT_FAILURE;
        }
    }

    match config.validate() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("{}", e);
            EXIT_INVALID_INPUT
        }
    }
}
