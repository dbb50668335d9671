//! Clap derive structures for the `remixly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// remixly -- remix text into tweets, emails, summaries and more
#[derive(Debug, Parser)]
#[command(
    name = "remixly",
    version,
    about = "Remix text into new formats from the command line",
    long_about = "A command-line client for the NextLogic AI content remixer.\n\n\
        Guests get a few free remixes of the basic styles; log in for the\n\
        full catalogue, or watch ads to unlock Premium styles for a day.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "REMIXLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "REMIXLY_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REMIXLY_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "REMIXLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (remixes can take a while)
    #[arg(long, env = "REMIXLY_TIMEOUT", global = true)]
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
    /// Show session, plan and remaining uses
    #[command(alias = "st")]
    Status,

    /// Log in to your account
    Login(LoginArgs),

    /// Log out and clear cached account data
    Logout,

    /// Remix text into the selected style
    #[command(alias = "r")]
    Remix(RemixArgs),

    /// List remix styles and whether you can use them
    #[command(alias = "styles")]
    Features,

    /// Show or select the current remix style
    Tool(ToolArgs),

    /// List or show remixes saved to your account
    History(HistoryArgs),

    /// Watch ads to unlock Premium for 24 hours
    Ads(AdsArgs),

    /// Activate a subscription after checkout
    Subscribe(SubscribeArgs),

    /// Send a message to the team
    Contact(ContactArgs),

    /// Show your referral code, share link and rewards
    Referral(ReferralArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's, then a prompt)
    #[arg(long, short = 'u', env = "REMIXLY_USERNAME")]
    pub username: Option<String>,

    /// Class access code for educational deployments
    #[arg(long)]
    pub access_code: Option<String>,

    /// Captcha token, when the deployment requires one
    #[arg(long, hide = true)]
    pub captcha_token: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REMIX
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RemixArgs {
    /// Text to remix ("-" reads stdin)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Remix style (defaults to the selected tool)
    #[arg(long, short = 's')]
    pub style: Option<String>,

    /// Save the result to your history (requires login)
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct ToolArgs {
    /// Style to select; omit to show the current one
    pub style: Option<String>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: Option<HistoryCommand>,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List saved remixes (default)
    #[command(alias = "ls")]
    List,

    /// Print one saved remix in full
    Show {
        /// Position in the list, starting at 1
        index: usize,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ADS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AdsArgs {
    #[command(subcommand)]
    pub command: AdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdsCommand {
    /// Record one watched ad
    Watch,

    /// Show today's ad progress and any active ad premium
    Status,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SubscribeArgs {
    /// Subscription ID returned by the payment provider
    pub subscription_id: String,
}

#[derive(Debug, Args)]
pub struct ReferralArgs {
    #[command(subcommand)]
    pub command: Option<ReferralCommand>,
}

#[derive(Debug, Subcommand)]
pub enum ReferralCommand {
    /// Show your code, share link and rewards (default)
    Show,

    /// Remember the code or share link you were invited with
    Accept {
        /// Referral code or a link containing `?ref=`
        code: String,
    },
}

#[derive(Debug, Args)]
pub struct ContactArgs {
    /// Your name
    #[arg(long)]
    pub name: String,

    /// Reply-to email address
    #[arg(long)]
    pub email: String,

    /// Message body
    #[arg(long, short = 'm')]
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value
    Set {
        /// Config key (dot-separated path, e.g., "profiles.school.backend")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
