use super::load_installed;
use crate::config::Runtime;
use crate::errors::StewError;
use crate::input::validate_cli_input;
use crate::prompt::Prompter;
use crate::render::highlight;
use anyhow::{Context, Result};
use std::fs;

/// `stew rename`
pub fn rename(rt: &Runtime, prompter: &dyn Prompter, binary: &str) -> Result<()> {
    validate_cli_input(binary)?;
    let mut lockfile = load_installed(rt)?;
    let index = lockfile
        .find_binary(binary)
        .ok_or_else(|| StewError::BinaryNotInstalled {
            binary: binary.to_string(),
        })?;

    let new_name = prompter.input("Rename the binary?", binary)?;
    let new_name = new_name.trim();
    validate_cli_input(new_name)?;
    if new_name == binary {
        println!("{} is already named {}", highlight(binary), highlight(new_name));
        return Ok(());
    }
    if lockfile.find_binary(new_name).is_some() {
        return Err(StewError::BinaryAlreadyInstalled {
            binary: new_name.to_string(),
        }
        .into());
    }

    let from = rt.paths.bin_path.join(binary);
    let to = rt.paths.bin_path.join(new_name);
    fs::rename(&from, &to)
        .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))?;

    lockfile.packages[index].binary = new_name.to_string();
    lockfile.save(&rt.paths.lock_path)?;

    println!(
        "✨ Successfully renamed {} to {}",
        highlight(binary),
        highlight(new_name)
    );
    Ok(())
}
