//! CLI command definitions for the `faredesk` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Customer-support backend: tickets, refunds, and the support bot.
#[derive(Parser)]
#[command(name = "faredesk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "FAREDESK_PORT")]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long, env = "FAREDESK_HOST")]
        host: Option<String>,
    },

    /// Show store statistics (tickets, refunds, sessions, users).
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
