//! Clap derive structures for the `dashfeed` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dashfeed -- follow live dashboard content from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "dashfeed",
    version,
    about = "Follow live dashboard content from the command line",
    long_about = "Connects to a dashboard backend, keeps a content feed open for one\n\
        path in one namespace, and prints the view every time it changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "DASHFEED_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'a', env = "DASHFEED_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DASHFEED_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DASHFEED_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DASHFEED_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow a content path and print the view as it changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// List namespaces offered by the backend
    #[command(alias = "ns")]
    Namespaces,

    /// Make a namespace the backend's active namespace
    Use(UseArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Content path to follow (default: profile start path)
    #[arg(long)]
    pub path: Option<String>,

    /// Namespace to switch to before following
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Exit after the first content document arrives
    #[arg(long)]
    pub once: bool,
}

// ── Use ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UseArgs {
    /// Namespace to activate
    pub namespace: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a profile to the config file
    Init {
        /// Backend base URL for the profile
        #[arg(long = "url")]
        url: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Namespace to watch by default
        #[arg(long)]
        namespace: Option<String>,

        /// Path opened by `watch` when none is given
        #[arg(long)]
        start_path: Option<String>,

        /// Replace an existing profile of the same name
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
