//! CLI command definitions for todo-store
//!
//! This module defines the CLI structure using clap's derive macros.
//! Every subcommand maps onto exactly one store operation.

pub mod run;
pub mod update;

use crate::format::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use update::UpdateArgs;

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Human-readable markdown (default)
    #[default]
    Markdown,
    /// Machine-readable JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Local todo store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Markdown, global = true)]
    pub format: FormatArg,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the database and table if they do not exist
    Init,

    /// List all todos, newest first
    List,

    /// Add a todo
    Add {
        /// Todo text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Change a todo's text and/or completion flag
    Update(UpdateArgs),

    /// Mark a todo as completed
    Complete {
        id: i64,
    },

    /// Mark a todo as not completed
    Reopen {
        id: i64,
    },

    /// Delete a todo
    Delete {
        id: i64,
    },

    /// Delete every todo (cannot be undone)
    Clear {
        /// Confirm that all todos should be removed
        #[arg(long)]
        yes: bool,
    },

    /// Show the table layout and journal mode
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_words() {
        let cli = Cli::parse_from(["todo-store", "add", "buy", "milk"]);
        match cli.command {
            Command::Add { text } => assert_eq!(text.join(" "), "buy milk"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.format, FormatArg::Markdown);
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["todo-store", "list", "--format", "json", "-d", "x.db"]);
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.format, FormatArg::Json);
        assert_eq!(cli.database.as_deref(), Some("x.db"));
    }

    #[test]
    fn add_requires_text() {
        assert!(Cli::try_parse_from(["todo-store", "add"]).is_err());
    }
}
