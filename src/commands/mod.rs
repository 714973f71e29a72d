//! Top-level commands. Each one loads the lockfile, changes it and saves it
//! again for every package it touches.

pub mod config;
pub mod install;
pub mod list;
pub mod rename;
pub mod uninstall;
pub mod upgrade;

use crate::config::{Runtime, StewPaths};
use crate::download::github::GithubProject;
use crate::errors::StewError;
use crate::input::validate_cli_input;
use crate::install::utils::remove_path;
use crate::lockfile::LockFile;
use crate::prompt::Prompter;
use anyhow::Result;

/// Ask the user to pick one of `options`, or fail when prompting is not allowed
pub(crate) fn select_or_fail(
    prompter: &dyn Prompter,
    batch_mode: bool,
    message: &str,
    options: &[String],
) -> Result<String> {
    if batch_mode {
        return Err(StewError::InteractiveInBatch {
            prompt: message.to_string(),
        }
        .into());
    }
    prompter.select(message, options)
}

/// Fetch a project's releases behind a spinner
pub(crate) fn fetch_project(rt: &Runtime, owner: &str, repo: &str) -> Result<GithubProject> {
    let spinner = crate::render::spinner(&format!("Fetching releases for {owner}/{repo}"))?;
    let project = GithubProject::fetch(&rt.config, owner, repo);
    spinner.finish_and_clear();
    project
}

/// `--all` and a binary name are mutually exclusive, and one of them is required
pub(crate) fn check_flag_and_input(all: bool, binary: Option<&str>) -> Result<(), StewError> {
    match (all, binary) {
        (true, Some(_)) => Err(StewError::CliFlagAndInput),
        (true, None) => Ok(()),
        (false, binary) => validate_cli_input(binary.unwrap_or_default()),
    }
}

/// Load the lockfile, failing when nothing is installed
pub(crate) fn load_installed(rt: &Runtime) -> Result<LockFile> {
    let lockfile = LockFile::load(&rt.paths.lock_path, &rt.os, &rt.arch)?;
    if lockfile.packages.is_empty() {
        return Err(StewError::NoBinariesInstalled.into());
    }
    Ok(lockfile)
}

/// Remove a package's stored asset and its installed binary
pub(crate) fn delete_asset_and_binary(paths: &StewPaths, asset: &str, binary: &str) -> Result<()> {
    if !asset.is_empty() {
        remove_path(&paths.pkg_path.join(asset))?;
    }
    remove_path(&paths.bin_path.join(binary))
}
