//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - generate: ask the backend for a spreadsheet and save it
//! - render: run a local workbook script without any backend
//! - prompt: print the instruction text that would be sent

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sheetwright - plain-language requests in, .xlsx files out
#[derive(Parser, Debug)]
#[command(name = "sheetwright")]
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
    pub command: Commands,
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
    /// Generate a spreadsheet from a plain-language request
    Generate {
        /// What the spreadsheet should contain
        task: String,

        /// Backend model (overrides config)
        #[arg(short, long)]
        model: Option<String>,

        /// Where to write the .xlsx (default: <output.dir>/<prefix>_<HHMMSS>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// API key for the generation backend
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Print the final script even on success
        #[arg(long)]
        show_program: bool,
    },

    /// Run a local workbook script and write the result
    Render {
        /// Script file (fences and leading prose are tolerated)
        script: PathBuf,

        /// Where to write the .xlsx
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the instruction text for a request without calling the backend
    Prompt {
        /// What the spreadsheet should contain
        task: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "sheetwright",
            "generate",
            "inventory sheet",
            "--model",
            "gemini-2.5-pro",
            "--api-key",
            "k",
            "-o",
            "out.xlsx",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                task,
                model,
                output,
                api_key,
                show_program,
            } => {
                assert_eq!(task, "inventory sheet");
                assert_eq!(model.as_deref(), Some("gemini-2.5-pro"));
                assert_eq!(output, Some(PathBuf::from("out.xlsx")));
                assert_eq!(api_key, "k");
                assert!(!show_program);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_render_with_global_flags() {
        let cli = Cli::try_parse_from(["sheetwright", "render", "plan.sheet", "-v", "-c", "cfg.yml"]).unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config, Some(PathBuf::from("cfg.yml")));
        assert!(matches!(cli.command, Commands::Render { .. }));
    }

    #[test]
    fn test_parse_prompt() {
        let cli = Cli::try_parse_from(["sheetwright", "prompt", "budget"]).unwrap();
        assert!(matches!(cli.command, Commands::Prompt { task } if task == "budget"));
    }
}
