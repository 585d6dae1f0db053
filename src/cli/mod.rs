//! CLI module for sheetwright - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
