//! Output formatting for the command line
//!
//! Every command renders either human-readable text or pretty JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::CookboxConfig;
use crate::error::CreationError;
use crate::progress::{ProgressSnapshot, ProgressStatus};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty JSON (machine-readable)
    Json,
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationOutcome {
    Succeeded,
    Failed,
}

/// Failure part of a [`CreationReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub code: String,
    pub stage: String,
    pub message: String,
}

impl From<&CreationError> for FailureReport {
    fn from(error: &CreationError) -> Self {
        Self {
            code: error.code().to_string(),
            stage: error.stage().to_string(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one `create` run, as printed to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationReport {
    pub recipe_id: String,
    pub video_id: String,
    pub title: String,
    pub outcome: CreationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReport>,
    pub duration_ms: u64,
    pub progress: ProgressSnapshot,
}

impl CreationReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == CreationOutcome::Succeeded
    }
}

/// Health status of the extraction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub available: bool,
    pub message: String,
    pub details: Option<String>,
}

impl HealthStatus {
    pub fn available(message: String) -> Self {
        Self {
            available: true,
            message,
            details: None,
        }
    }

    pub fn unavailable(message: String) -> Self {
        Self {
            available: false,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_creation(&self, report: &CreationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize creation report to JSON"),
            OutputFormat::Human => Ok(self.format_creation_human(report)),
        }
    }

    pub fn format_config(&self, config: &CookboxConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let ordered: BTreeMap<_, _> = config.to_display_map().into_iter().collect();
                serde_json::to_string_pretty(&ordered)
                    .context("Failed to serialize configuration to JSON")
            }
            OutputFormat::Human => Ok(format!("{}", config)),
        }
    }

    pub fn format_health(&self, health_results: &HashMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(health_results)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Human => Ok(self.format_health_human(health_results)),
        }
    }

    fn format_creation_human(&self, report: &CreationReport) -> String {
        let mut output = String::new();

        let headline = if report.succeeded() {
            "\u{2713} Recipe created"
        } else {
            "\u{2717} Recipe creation failed"
        };
        output.push_str(&format!("{}\n{}\n\n", headline, RULE));
        output.push_str(&format!("  Recipe:   {}\n", report.recipe_id));
        output.push_str(&format!("  Video:    {}\n", report.video_id));
        output.push_str(&format!("  Title:    {}\n", report.title));
        if let Some(ref caption) = report.caption {
            output.push_str(&format!("  Caption:  {}\n", caption));
        }
        output.push_str(&format!("  Duration: {}ms\n", report.duration_ms));

        if let Some(ref failure) = report.failure {
            output.push_str("\nFailure:\n");
            output.push_str(&format!("  Stage: {}\n", failure.stage));
            output.push_str(&format!("  Code:  {}\n", failure.code));
            output.push_str(&format!("  Error: {}\n", failure.message));
        }

        if !report.progress.entries.is_empty() {
            output.push_str("\nProgress:\n");
            for entry in &report.progress.entries {
                let symbol = match entry.status {
                    ProgressStatus::Started => "\u{2026}",
                    ProgressStatus::Succeeded => "\u{2713}",
                    ProgressStatus::Failed => "\u{2717}",
                };
                let label = if entry.step.as_str() == entry.detail.as_str() {
                    entry.step.to_string()
                } else {
                    format!("{}/{}", entry.step, entry.detail)
                };
                output.push_str(&format!("  {} {:<20} {}\n", symbol, label, entry.status));
            }
        }

        output
    }

    fn format_health_human(&self, health_results: &HashMap<String, HealthStatus>) -> String {
        let mut output = String::new();

        output.push_str("Service Health Status\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let mut names: Vec<_> = health_results.keys().collect();
        names.sort();

        for name in names {
            let status = &health_results[name];
            let symbol = if status.available {
                "\u{2713}"
            } else {
                "\u{2717}"
            };

            output.push_str(&format!("{} {}\n", symbol, name));
            output.push_str(&format!(
                "  Status: {}\n",
                if status.available {
                    "Available"
                } else {
                    "Unavailable"
                }
            ));
            output.push_str(&format!("  Message: {}\n", status.message));
            if let Some(ref details) = status.details {
                output.push_str(&format!("  Details: {}\n", details));
            }
            output.push('\n');
        }

        output
    }
}
