//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: run one appointment workflow
//! - tools: list the registered operations
//! - audit: show recent audit events

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Request used when `run` is given no query
pub const DEFAULT_QUERY: &str =
    "Schedule a cardiology follow-up for patient Ravi Kumar next week and check insurance eligibility";

/// Clinic Agent - tool-calling orchestration for appointment workflows
#[derive(Parser, Debug)]
#[command(name = "clinic-agent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one workflow for a natural-language request
    Run(RunArgs),

    /// List the registered operations and their parameter schemas
    Tools,

    /// Show the most recent audit events
    Audit {
        /// Number of events to show (0 shows all)
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Natural-language request
    pub query: Option<String>,

    /// Stop before executing the first selected operation
    #[arg(long, conflicts_with = "live")]
    pub dry_run: bool,

    /// Execute operations even if the config defaults to dry-run
    #[arg(long)]
    pub live: bool,
}

impl RunArgs {
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }

    /// Flags win over the configured default
    pub fn dry_run(&self, configured: bool) -> bool {
        match (self.dry_run, self.live) {
            (true, _) => true,
            (_, true) => false,
            _ => configured,
        }
    }
}

/// Events to skip so that the last `limit` of `total` remain; 0 keeps all
pub fn audit_skip(total: usize, limit: usize) -> usize {
    match limit {
        0 => 0,
        limit => total.saturating_sub(limit),
    }
}
