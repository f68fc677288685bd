//! Command-line surface.
//!
//! `Cli` is parsed by clap; `handlers::run` dispatches each subcommand.
//! Flag checks clap cannot express live in [`Cli::validate`] so they fail
//! as usage errors before any config or network work.

pub mod handlers;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::SearchCriteria;
use crate::spec_file::SpecKind;

pub use handlers::run;

#[derive(Parser, Debug)]
#[command(
    name = "comparer-cli",
    about = "CLI tool for interacting with the Agent Comparer API",
    version
)]
pub struct Cli {
    /// Run against a particular server instead of the configured one
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Read settings from this file instead of the default location
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all available model combinations
    ListModels {
        /// Search string to filter models (provider, family or name)
        #[arg(long)]
        search: Option<String>,

        /// Also write the listing to a CSV file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// List all available providers with their model counts
    ListProviders,

    /// Get provider statistics
    Stats,

    /// Search for models with specific criteria
    Search(SearchArgs),

    /// Compare models using a spec from a JSON file
    Compare {
        /// Path to the compare spec (see `sample-spec compare`)
        spec: PathBuf,

        /// Write the JSON response to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Show the comparison as a table with the cheapest option
        #[arg(long)]
        summary: bool,
    },

    /// Calculate prices using input from a JSON file
    Calculate {
        /// Path to the calculate spec (see `sample-spec calculate`)
        spec: PathBuf,

        /// Write the JSON response to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Show the calculation as a table with the total cost
        #[arg(long)]
        summary: bool,
    },

    /// Generate sample input JSON for compare or calculate commands
    SampleSpec {
        /// Which command the sample is for
        #[arg(value_enum)]
        command: SpecKind,

        /// Write the sample to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print where the config file is read from
    Path,
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Filter by provider name
    #[arg(long)]
    pub provider: Option<String>,

    /// Minimum context window size
    #[arg(long, value_name = "TOKENS")]
    pub min_context: Option<u64>,

    /// Maximum context window size
    #[arg(long, value_name = "TOKENS")]
    pub max_context: Option<u64>,

    /// Minimum output tokens
    #[arg(long, value_name = "TOKENS")]
    pub min_output_tokens: Option<u64>,

    /// Maximum output tokens
    #[arg(long, value_name = "TOKENS")]
    pub max_output_tokens: Option<u64>,

    /// Only models with tool use
    #[arg(long, conflicts_with = "no_tools")]
    pub tools: bool,
    /// Only models without tool use
    #[arg(long)]
    pub no_tools: bool,

    /// Only multilingual models
    #[arg(long, conflicts_with = "no_multilingual")]
    pub multilingual: bool,
    /// Only models without multilingual support
    #[arg(long)]
    pub no_multilingual: bool,

    /// Only models with audio support
    #[arg(long, conflicts_with = "no_audio")]
    pub audio: bool,
    /// Only models without audio support
    #[arg(long)]
    pub no_audio: bool,

    /// Only models with vision support
    #[arg(long, conflicts_with = "no_vision")]
    pub vision: bool,
    /// Only models without vision support
    #[arg(long)]
    pub no_vision: bool,

    /// Only models with reasoning capabilities
    #[arg(long, conflicts_with = "no_reasoning")]
    pub reasoning: bool,
    /// Only models without reasoning capabilities
    #[arg(long)]
    pub no_reasoning: bool,

    /// Only models that support fine-tuning
    #[arg(long, conflicts_with = "no_fine_tuning")]
    pub fine_tuning: bool,
    /// Only models that do not support fine-tuning
    #[arg(long)]
    pub no_fine_tuning: bool,

    /// Only models with realtime streaming
    #[arg(long, conflicts_with = "no_streaming")]
    pub streaming: bool,
    /// Only models without realtime streaming
    #[arg(long)]
    pub no_streaming: bool,

    /// Print the raw JSON response instead of a table
    #[arg(long)]
    pub json: bool,

    /// Also write the results to a CSV file
    #[arg(long, value_name = "FILE", conflicts_with = "json")]
    pub export: Option<PathBuf>,
}

/// `--x` => Some(true), `--no-x` => Some(false), neither => None.
fn tri_state(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl SearchArgs {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            provider: self.provider.clone(),
            min_context: self.min_context,
            max_context: self.max_context,
            min_output_tokens: self.min_output_tokens,
            max_output_tokens: self.max_output_tokens,
            tools: tri_state(self.tools, self.no_tools),
            multilingual: tri_state(self.multilingual, self.no_multilingual),
            audio: tri_state(self.audio, self.no_audio),
            vision: tri_state(self.vision, self.no_vision),
            reasoning: tri_state(self.reasoning, self.no_reasoning),
            fine_tuning: tri_state(self.fine_tuning, self.no_fine_tuning),
            realtime_streaming: tri_state(self.streaming, self.no_streaming),
        }
    }
}

impl Cli {
    /// Checks that need more than one flag at a time.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Commands::Search(args) => args.criteria().validate(),
            _ => Ok(()),
        }
    }

    /// Whether the command talks to the service (and so needs the API key).
    pub fn needs_network(&self) -> bool {
        !matches!(self.command, Commands::Config { .. })
    }

    /// Commands that still run when the config file does not parse.
    pub fn ignores_config_errors(&self) -> bool {
        matches!(
            self.command,
            Commands::Config {
                action: ConfigAction::Init { .. } | ConfigAction::Path
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("comparer-cli").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_bounds_only() {
        let cli = parse(&["search", "--min-context", "8000", "--max-context", "32000"]).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(
            args.criteria(),
            SearchCriteria {
                min_context: Some(8000),
                max_context: Some(32000),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_tri_state_flags() {
        let cli = parse(&["search", "--tools", "--no-vision", "--streaming"]).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.tools, Some(true));
        assert_eq!(criteria.vision, Some(false));
        assert_eq!(criteria.realtime_streaming, Some(true));
        assert_eq!(criteria.audio, None);
    }

    #[test]
    fn test_conflicting_pair_is_usage_error() {
        let err = parse(&["search", "--tools", "--no-tools"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_inverted_range_fails_validation() {
        let cli = parse(&["search", "--min-context", "64000", "--max-context", "8000"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_sample_spec_rejects_unknown_kind() {
        assert!(parse(&["sample-spec", "compare"]).is_ok());
        assert!(parse(&["sample-spec", "explain"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_global_server_after_subcommand() {
        let cli = parse(&["stats", "--server", "http://127.0.0.1:1"]).unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://127.0.0.1:1"));
        assert!(cli.needs_network());

        let cli = parse(&["config", "path"]).unwrap();
        assert!(!cli.needs_network());
    }

    #[test]
    fn test_only_init_and_path_ignore_config_errors() {
        assert!(parse(&["config", "init", "--force"]).unwrap().ignores_config_errors());
        assert!(parse(&["config", "path"]).unwrap().ignores_config_errors());
        assert!(!parse(&["config", "show"]).unwrap().ignores_config_errors());
        assert!(!parse(&["stats"]).unwrap().ignores_config_errors());
    }

    #[test]
    fn test_search_json_conflicts_with_export() {
        let err = parse(&["search", "--json", "--export", "out.csv"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(parse(&["search", "--export", "out.csv"]).is_ok());
    }
}
