//! Command-line argument definition.

use clap::{Parser, Subcommand};

/// hostupd - manage repositories and apply package updates on a host panel
#[derive(Parser, Debug)]
#[command(name = "hostupd")]
#[command(version)]
#[command(about = "Manage software repositories and apply package updates on a host panel", long_about = None)]
pub struct Args {
    /// Panel URL (overrides `server_url` from settings.conf)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pause between update steps in milliseconds (overrides `step_delay_ms`)
    #[arg(long, global = true)]
    pub step_delay_ms: Option<u64>,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which features the host supports
    Capabilities,
    /// Manage software repositories
    Repos {
        /// Repository action
        #[command(subcommand)]
        action: ReposCommand,
    },
    /// Inspect available updates
    Updates {
        /// Updates action
        #[command(subcommand)]
        action: UpdatesCommand,
    },
    /// Update the given packages one at a time (comma- or space-separated)
    Update {
        /// Packages to update, in order
        #[arg(required = true, num_args = 1..)]
        packages: Vec<String>,
    },
    /// Update every package on the host
    UpdateAll,
    /// Follow a system update that is still running, or list updates
    Resume,
}

/// Repository actions.
#[derive(Subcommand, Debug)]
pub enum ReposCommand {
    /// List repositories
    List,
    /// Add a repository
    Add {
        /// Repository id (yum); omit for deb sources
        #[arg(long, default_value = "")]
        id: String,
        /// Base URL
        #[arg(long)]
        url: String,
        /// Extra settings as key=value (repeatable), e.g. dist=bookworm
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
    /// Edit one repository
    Edit {
        /// Repository id
        id: String,
        /// New base URL
        #[arg(long)]
        url: Option<String>,
        /// Settings to overwrite as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
    /// Enable disabled and disable enabled repositories
    Toggle {
        /// Repository ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Delete repositories
    Remove {
        /// Repository ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

/// Update listing actions.
#[derive(Subcommand, Debug)]
pub enum UpdatesCommand {
    /// List packages with an available update
    List,
}
