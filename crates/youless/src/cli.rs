//! Clap derive structures for the `youless` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use youless_core::WindowKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// youless -- read a Youless energy meter from the command line
#[derive(Debug, Parser)]
#[command(
    name = "youless",
    version,
    about = "Read a Youless energy meter from the command line",
    long_about = "Query live readings and usage history from a Youless energy meter\n\
        on the local network. Password-protected devices are logged into\n\
        automatically.",
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
    /// Meter profile to use
    #[arg(long, short = 'p', env = "YOULESS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Meter hostname or IP address (overrides profile)
    #[arg(long, short = 'H', env = "YOULESS_HOST", global = true)]
    pub host: Option<String>,

    /// Meter HTTP port (overrides profile)
    #[arg(long, short = 'P', env = "YOULESS_PORT", global = true)]
    pub port: Option<u16>,

    /// Meter password
    #[arg(long, env = "YOULESS_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "YOULESS_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "YOULESS_TIMEOUT", global = true)]
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
    /// Show live readings (power, meter total, connection)
    #[command(alias = "st")]
    Status,

    /// Show one usage history window
    #[command(alias = "u")]
    Usage(UsageArgs),

    /// Show the last hour at one-minute resolution
    LastHour,

    /// Show the last 24 hours at ten-minute resolution
    LastDay,

    /// Inspect the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Usage ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsageArgs {
    /// History window
    #[arg(value_enum)]
    pub window: WindowArg,

    /// Window index: hour 1-2, eight-hours 1-3, day 0-6 (0 = today), month 1-12
    pub index: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WindowArg {
    /// Half an hour, one reading per minute
    Hour,
    /// Eight hours, one reading per ten minutes
    EightHours,
    /// A whole day, one reading per hour
    Day,
    /// A month, one reading per day
    Month,
}

impl From<WindowArg> for WindowKind {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Hour => Self::Hour,
            WindowArg::EightHours => Self::EightHours,
            WindowArg::Day => Self::Day,
            WindowArg::Month => Self::Month,
        }
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (passwords masked)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
