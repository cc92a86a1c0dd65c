use crate::services::RecipeId;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Turn cooking videos into structured recipes
#[derive(Parser, Debug)]
#[command(
    name = "cookbox",
    about = "Turn cooking videos into structured recipes",
    version,
    long_about = "cookbox drives the recipe extraction service through the full creation \
                  workflow: video verification, detail/instruction/briefing extraction in \
                  parallel, and finalization, reporting per-stage progress along the way."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Create a recipe from a video",
        long_about = "Runs the recipe creation pipeline for one video and prints the outcome \
                      together with the per-stage progress.\n\n\
                      Examples:\n  \
                      cookbox create https://youtu.be/dQw4w9WgXcQ --title \"Kimchi Jjigae\"\n  \
                      cookbox create dQw4w9WgXcQ --title Bibimbap --format json"
    )]
    Create(CreateArgs),

    #[command(
        about = "Check extraction service availability",
        long_about = "Checks that the configured extraction service is reachable.\n\n\
                      Examples:\n  \
                      cookbox health\n  \
                      cookbox health --format json"
    )]
    Health(HealthArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    #[arg(value_name = "URL", help = "Video URL or bare video id")]
    pub url: String,

    #[arg(short = 't', long, value_name = "TITLE", help = "Recipe title")]
    pub title: String,

    #[arg(
        long,
        value_name = "UUID",
        help = "Recipe id to create under (a new one is generated by default)"
    )]
    pub recipe_id: Option<RecipeId>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_create_defaults() {
        let args = CliArgs::parse_from([
            "cookbox",
            "create",
            "https://youtu.be/dQw4w9WgXcQ",
            "--title",
            "Kimchi Jjigae",
        ]);
        match args.command {
            Commands::Create(create_args) => {
                assert_eq!(create_args.url, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(create_args.title, "Kimchi Jjigae");
                assert!(create_args.recipe_id.is_none());
                assert_eq!(create_args.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_create_with_options() {
        let args = CliArgs::parse_from([
            "cookbox",
            "create",
            "dQw4w9WgXcQ",
            "-t",
            "Bibimbap",
            "--recipe-id",
            "6f1c2a8e-3d4b-4c5a-9e7f-0a1b2c3d4e5f",
            "--format",
            "json",
        ]);
        match args.command {
            Commands::Create(create_args) => {
                assert_eq!(
                    create_args.recipe_id.map(|id| id.to_string()),
                    Some("6f1c2a8e-3d4b-4c5a-9e7f-0a1b2c3d4e5f".to_string())
                );
                assert_eq!(create_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_create_rejects_bad_recipe_id() {
        let result = CliArgs::try_parse_from([
            "cookbox",
            "create",
            "dQw4w9WgXcQ",
            "--title",
            "Bibimbap",
            "--recipe-id",
            "not-a-uuid",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_requires_title() {
        assert!(CliArgs::try_parse_from(["cookbox", "create", "dQw4w9WgXcQ"]).is_err());
    }

    #[test]
    fn test_health_and_config_commands() {
        let args = CliArgs::parse_from(["cookbox", "health", "--format", "json"]);
        assert!(matches!(
            args.command,
            Commands::Health(HealthArgs {
                format: OutputFormatArg::Json
            })
        ));

        let args = CliArgs::parse_from(["cookbox", "config"]);
        assert!(matches!(args.command, Commands::Config(_)));
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["cookbox", "-vv", "health"]);
        assert_eq!(args.verbose, 2);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["cookbox", "-q", "health"]);
        assert_eq!(args.verbose, 0);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["cookbox", "--log-level", "debug", "config"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["cookbox", "-v", "-q", "health"]).is_err());
    }
}
