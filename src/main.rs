//! todo-store
//!
//! Command-line front end for the local todo store.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use todo_store::cli::Cli;
use todo_store::cli::run::{execute, render_error};
use todo_store::config::ConfigLoader;
use todo_store::format::OutputFormat;
use todo_store::logging::{LogTarget, init_logging};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = ConfigLoader::load(cli.config.as_deref().map(Path::new))?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Using config file");
    }
    debug!(tiers = ?loader.tiers(), "Configuration loaded");
    if let Some(db_path) = &cli.database {
        let store = &mut loader.config_mut().store;
        store.db_path = PathBuf::from(db_path);
        store.in_memory = false;
    }
    let config = loader.into_config();

    let store = config.build_store();
    let format = OutputFormat::from(cli.format);

    match execute(&store, &cli.command, format).await {
        Ok(output) => {
            print!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprint!("{}", render_error(&err, format));
            Ok(ExitCode::FAILURE)
        }
    }
}
