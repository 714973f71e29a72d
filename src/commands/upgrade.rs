use super::{check_flag_and_input, fetch_project, load_installed};
use crate::asset::select_asset;
use crate::config::Runtime;
use crate::download::github::GithubProject;
use crate::download::http;
use crate::errors::StewError;
use crate::install::utils::remove_path;
use crate::install::{Installation, install_binary};
use crate::lockfile::{LockFile, Source};
use crate::prompt::Prompter;
use crate::render::{highlight, print_warning};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// `stew upgrade`
pub fn upgrade(
    rt: &Runtime,
    prompter: &dyn Prompter,
    binary: Option<&str>,
    all: bool,
    batch_mode: bool,
) -> Result<()> {
    check_flag_and_input(all, binary)?;
    let mut lockfile = load_installed(rt)?;

    let targets: Vec<String> = match binary {
        Some(binary) if !all => vec![binary.to_string()],
        _ => lockfile
            .packages
            .iter()
            .map(|pkg| pkg.binary.clone())
            .filter(|binary| {
                let excluded = rt.config.excluded_from_upgrade_all.contains(binary);
                if excluded {
                    debug!(%binary, "excluded from upgrade --all");
                }
                !excluded
            })
            .collect(),
    };

    for binary in &targets {
        let result = upgrade_one(rt, prompter, &mut lockfile, binary, batch_mode);
        match result {
            Ok(()) => {}
            Err(err) if all => match err.downcast_ref::<StewError>() {
                Some(
                    stew_err @ (StewError::InstalledFromUrl { .. }
                    | StewError::AlreadyInstalledLatestTag { .. }),
                ) => print_warning(stew_err),
                _ => return Err(err),
            },
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn upgrade_one(
    rt: &Runtime,
    prompter: &dyn Prompter,
    lockfile: &mut LockFile,
    binary: &str,
    batch_mode: bool,
) -> Result<()> {
    let index = lockfile
        .find_binary(binary)
        .ok_or_else(|| StewError::BinaryNotInstalled {
            binary: binary.to_string(),
        })?;
    let pkg = &lockfile.packages[index];
    if pkg.source == Source::Other {
        return Err(StewError::InstalledFromUrl {
            binary: binary.to_string(),
        }
        .into());
    }

    rt.paths.reset_tmp()?;
    println!("{}", highlight(&format!("{}/{}", pkg.owner, pkg.repo)));
    let project = fetch_project(rt, &pkg.owner, &pkg.repo)?;
    apply_upgrade(rt, prompter, lockfile, index, &project, batch_mode, |url, path| {
        http::download_file(&rt.config, url, path)
    })
}

/// Move the record at `index` to the project's latest release.
///
/// `download` fetches the chosen asset's URL into the given path.
pub(crate) fn apply_upgrade(
    rt: &Runtime,
    prompter: &dyn Prompter,
    lockfile: &mut LockFile,
    index: usize,
    project: &GithubProject,
    batch_mode: bool,
    download: impl FnOnce(&str, &Path) -> Result<()>,
) -> Result<()> {
    let pkg = lockfile.packages[index].clone();
    let latest_tag = project.latest_tag()?;
    if latest_tag == pkg.tag {
        return Err(StewError::AlreadyInstalledLatestTag { tag: latest_tag }.into());
    }

    let assets = project.release_assets(&latest_tag)?;
    let asset = select_asset(&rt.os, &rt.arch, &assets, batch_mode, prompter)?;
    let url = project
        .download_url(&latest_tag, &asset)
        .with_context(|| format!("Release {latest_tag} has no download URL for {asset}"))?;

    let download_path = rt.paths.pkg_path.join(&asset);
    if download_path.exists() {
        return Err(StewError::AssetAlreadyDownloaded { asset }.into());
    }
    download(&url, &download_path)?;
    println!(
        "✅ Downloaded {} to {}",
        highlight(&asset),
        highlight(&rt.paths.pkg_path.display().to_string())
    );

    let installed = install_binary(
        &rt.paths,
        prompter,
        &Installation {
            downloaded_file_path: &download_path,
            repo: &pkg.repo,
            binary_name: Some(&pkg.binary),
            expected_binary_hash: pkg.binary_hash.as_deref(),
            batch_mode,
        },
        lockfile,
        true,
    )
    .inspect_err(|_| {
        let _ = remove_path(&download_path);
    })?;

    info!(binary = %pkg.binary, from = %pkg.tag, to = %latest_tag, "upgraded package");
    lockfile.packages[index].update_release(&latest_tag, &asset, &url, Some(installed.hash));
    lockfile.save(&rt.paths.lock_path)?;

    println!(
        "✨ Successfully upgraded the {} binary from {} to {}",
        highlight(&pkg.binary),
        highlight(&pkg.tag),
        highlight(&latest_tag)
    );
    Ok(())
}
