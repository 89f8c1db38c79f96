//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONTACT_URL;

/// Manages the s4tk.config.json of a Sims 4 modding project.
#[derive(Parser, Debug)]
#[command(name = "s4tk-project", version, about, long_about = None)]
pub struct Cli {
    /// Project root containing s4tk.config.json.
    #[arg(short, long, default_value = ".", env = "S4TK_PROJECT_ROOT", global = true)]
    pub root: PathBuf,

    /// Page opened by "Get Help" and "Report Problem".
    #[arg(long, default_value = DEFAULT_CONTACT_URL, env = "S4TK_CONTACT_URL", global = true)]
    pub contact_url: String,

    /// Prompt for notification actions on stdin.
    #[arg(short, long, default_value = "false", global = true)]
    pub interactive: bool,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level based on verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the config and keep reloading it as the file changes.
    Watch,

    /// Load and validate the config once.
    Load,

    /// Print the loaded config in canonical form.
    Show,

    /// Create a default project in the root.
    Init,

    /// Set the default string table and save the config.
    #[command(name = "set-default-stbl")]
    SetDefaultStbl {
        /// Path of the string table, relative to the project root.
        path: String,
    },

    /// List string tables in the project.
    Strings,
}
