//! CLI entry point for Claudebin.

pub mod auth;
pub mod share;

use clap::{Parser, Subcommand};

/// Claudebin CLI
#[derive(Parser, Debug)]
#[command(name = "claudebin", version, about = "Share Claude Code sessions on Claudebin")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Print the latest session transcript for a project
    Extract(ExtractArgs),
    /// Publish the latest session transcript for a project
    Share(ShareArgs),
    /// Publish with stored credentials only, without signing in or opening a browser
    Publish(PublishArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in through the browser
    Login,
    /// Show the cached account
    Status,
    /// Remove stored credentials
    Logout,
}

/// Arguments for `claudebin extract`.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Absolute path of the project the session belongs to
    pub project_path: String,
}

/// Arguments for `claudebin share`.
#[derive(Parser, Debug)]
pub struct ShareArgs {
    /// Absolute path of the project the session belongs to
    pub project_path: String,

    /// Title shown on the published page
    #[arg(short, long)]
    pub title: Option<String>,

    /// Only reachable through its link
    #[arg(long)]
    pub unlisted: bool,

    /// Print the link without opening a browser
    #[arg(long)]
    pub no_browser: bool,
}

/// Arguments for `claudebin publish`.
#[derive(Parser, Debug)]
pub struct PublishArgs {
    /// Absolute path of the project the session belongs to
    pub project_path: String,

    /// Title shown on the published page
    #[arg(short, long)]
    pub title: Option<String>,

    /// Only reachable through its link
    #[arg(long)]
    pub unlisted: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter for the binary.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "claudebin=debug"
        } else {
            "claudebin=info"
        }
    }
}
