use crate::commands;
use crate::config::Runtime;
use crate::models::{Args, Commands};
use crate::prompt::{Prompter, TerminalPrompter};
use anyhow::Result;
use tracing::debug;

/// Load the config (creating it on first run) and clear the scratch directory.
///
/// Batch runs create a missing config from the defaults instead of asking.
fn runtime(prompter: &dyn Prompter, batch_mode: bool) -> Result<Runtime> {
    let rt = Runtime::initialize((!batch_mode).then_some(prompter))?;
    rt.paths.reset_tmp()?;
    debug!(
        os = %rt.os,
        arch = %rt.arch,
        stew_path = %rt.paths.stew_path.display(),
        "runtime ready"
    );
    Ok(rt)
}

/// Main CLI entry point
pub fn run(args: Args) -> Result<()> {
    let prompter = TerminalPrompter;

    match args.command {
        Commands::Install { inputs, batch } => {
            let rt = runtime(&prompter, batch)?;
            commands::install::install(&rt, &prompter, &inputs, batch)?;
        }
        Commands::Upgrade { binary, all, batch } => {
            let rt = runtime(&prompter, batch)?;
            commands::upgrade::upgrade(&rt, &prompter, binary.as_deref(), all, batch)?;
        }
        Commands::Uninstall { binary, all } => {
            let rt = runtime(&prompter, false)?;
            commands::uninstall::uninstall(&rt, binary.as_deref(), all)?;
        }
        Commands::Rename { binary } => {
            let rt = runtime(&prompter, false)?;
            commands::rename::rename(&rt, &prompter, &binary)?;
        }
        Commands::List { tags } => {
            let rt = runtime(&prompter, false)?;
            commands::list::list(&rt, tags)?;
        }
        // Runs without a runtime so it can repair a broken config
        Commands::Config => commands::config::config(&prompter)?,
    }

    Ok(())
}
