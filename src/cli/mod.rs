//! CLI module for clinic-agent - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
