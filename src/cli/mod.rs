pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ConfigArgs, CreateArgs, HealthArgs};
pub use output::{CreationReport, OutputFormat, OutputFormatter};
