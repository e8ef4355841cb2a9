//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for family-assistant
#[derive(Parser, Debug)]
#[command(name = "family-assistant")]
#[command(author, version, about = "Ask questions about your family data in plain language")]
#[command(long_about = r#"
Family Assistant answers natural-language questions about families, members
and events. The selected AI provider decides which lookups it needs; the
assistant runs them against the family service and returns one answer.

Configuration files are loaded from (in priority order):
1. FAMILY_ASSISTANT_* environment variables
2. --config <path>     Explicit config file
3. ./family-assistant.toml   Project-level config
4. ~/.config/family-assistant/config.toml   Global config

Example:
  family-assistant ask "Find the family named Nguyen"
  family-assistant ask --provider local "When is Lan's next birthday?"
  family-assistant status --provider openai
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask one question and print the answer
    Ask {
        /// The question
        prompt: String,

        /// AI provider to use (gemini, openai, ollama or an alias)
        #[arg(short, long, value_name = "NAME")]
        provider: Option<String>,

        /// Bearer token forwarded to the family service
        #[arg(long, env = "FAMILY_ASSISTANT_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Suppress the waiting indicator
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check whether an AI provider is reachable
    Status {
        /// AI provider to check (default provider when omitted)
        #[arg(short, long, value_name = "NAME")]
        provider: Option<String>,
    },

    /// List the tools offered to the model
    Tools {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}
