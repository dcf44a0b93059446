//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Burrow CLI - call HTTP resource APIs by walking their address tree
///
/// Each positional segment names one child address below the base URL, so
/// `burrow get users 42 posts` requests `<base_url>/users/42/posts`.
#[derive(Parser, Debug)]
#[command(
    name = "burrow",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "BURROW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that shape the root node; each one overrides the active profile
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Profile from the configuration file to start from
    #[arg(short, long, global = true, env = "BURROW_PROFILE")]
    pub profile: Option<String>,

    /// Base URL of the API
    #[arg(short = 'u', long, global = true, env = "BURROW_BASE_URL")]
    pub base_url: Option<String>,

    /// Body format used for requests and responses (json, yaml)
    #[arg(short = 'f', long, global = true)]
    pub format: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "BURROW_TOKEN", conflicts_with = "user")]
    pub token: Option<String>,

    /// Username for basic authentication
    #[arg(long, global = true, env = "BURROW_USER")]
    pub user: Option<String>,

    /// Password for basic authentication
    #[arg(long, global = true, env = "BURROW_PASSWORD", requires = "user")]
    pub password: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a resource
    Get(TargetArgs),

    /// Create a resource; a 201 response is followed to the new resource
    Post(WriteArgs),

    /// Replace a resource
    Put(WriteArgs),

    /// Remove a resource
    Delete(TargetArgs),

    /// Inspect configuration files and profiles
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Address of the resource a verb is applied to
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Child names below the base URL, outermost first
    #[arg(value_name = "SEGMENT")]
    pub segments: Vec<String>,

    /// Member id appended after the segments
    #[arg(long)]
    pub id: Option<String>,

    /// Query parameter, repeatable
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,
}

/// Arguments for verbs that send a body
#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Request body as JSON or YAML, or `@path` to read it from a file
    #[arg(short, long, value_name = "DATA")]
    pub data: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the loaded configuration with secrets redacted
    Show(ConfigShowArgs),

    /// List available profiles
    Profiles,

    /// Print the path of the loaded configuration file
    Path,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(long = "as", value_name = "FORMAT", value_enum, default_value = "yaml")]
    pub style: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Split `key=value`; the value may itself contain `=`
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
