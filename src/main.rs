use cookbox::cli::commands::{CliArgs, Commands};
use cookbox::cli::handlers::{handle_config, handle_create, handle_health};
use cookbox::util::logging::{self, LoggingConfig};
use cookbox::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Create(create_args) => handle_create(create_args, args.quiet).await,
        Commands::Health(health_args) => handle_health(health_args).await,
        Commands::Config(config_args) => handle_config(config_args),
    };

    process::exit(exit_code);
}

/// Command line flags take precedence over `COOKBOX_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();
    if args.log_level.is_some() || args.verbose > 0 || args.quiet {
        config.level = logging::level_from_flags(args.log_level.as_deref(), args.verbose, args.quiet);
    }

    logging::init_logging(LoggingConfig {
        include_thread_ids: args.verbose > 1,
        ..config
    });
}
