use super::{fetch_project, select_or_fail};
use crate::asset::select_asset;
use crate::config::Runtime;
use crate::download::http;
use crate::errors::StewError;
use crate::input::{CliInput, parse_cli_input, read_stewfile_contents};
use crate::install::utils::remove_path;
use crate::install::{Installation, install_binary};
use crate::lockfile::{LockFile, PackageData, read_lockfile_inputs};
use crate::prompt::Prompter;
use crate::render::{highlight, print_error, print_warning};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the install inputs came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Arguments,
    /// A Stewfile or lockfile
    File,
}

/// Install inputs, each parsed or carrying its parse error
pub type Requests = Vec<Result<CliInput>>;

/// Expand the command line into install requests.
///
/// An argument naming a `Stewfile.lock.json` or a `Stewfile` replaces all
/// arguments with that file's contents.
pub fn collect_inputs(cli_inputs: &[String]) -> Result<(Requests, InputSource)> {
    for cli_input in cli_inputs {
        if cli_input.contains("Stewfile.lock.json") {
            let inputs = read_lockfile_inputs(Path::new(cli_input))?;
            return Ok((inputs.into_iter().map(Ok).collect(), InputSource::File));
        }
        if cli_input.contains("Stewfile") {
            let lines = read_stewfile_contents(Path::new(cli_input))?;
            let requests = lines
                .iter()
                .map(|line| parse_cli_input(line).map_err(Into::into))
                .collect();
            return Ok((requests, InputSource::File));
        }
    }

    let requests = cli_inputs
        .iter()
        .map(|input| parse_cli_input(input).map_err(Into::into))
        .collect();
    Ok((requests, InputSource::Arguments))
}

/// `stew install`.
///
/// With several inputs each failure is reported and the rest still install;
/// the run then ends with [`StewError::BatchFailures`].
pub fn install(
    rt: &Runtime,
    prompter: &dyn Prompter,
    cli_inputs: &[String],
    batch_mode: bool,
) -> Result<()> {
    let (requests, source) = collect_inputs(cli_inputs)?;
    debug!(?source, "collected install inputs");
    if requests.is_empty() {
        return Err(StewError::EmptyCliInput.into());
    }

    let total = requests.len();
    let mut failed = 0;
    for request in requests {
        let outcome = request.and_then(|input| install_one(rt, prompter, &input, batch_mode));
        let Err(err) = outcome else {
            continue;
        };

        if let Some(stew_err) = err.downcast_ref::<StewError>()
            && stew_err.is_clean_abort()
        {
            print_warning(stew_err);
            continue;
        }
        // A lone input fails like any other command
        if total == 1 {
            return Err(err);
        }
        print_error(&err);
        failed += 1;
    }

    if failed > 0 {
        return Err(StewError::BatchFailures { failed, total }.into());
    }
    Ok(())
}

/// Release asset chosen for an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Empty for URL inputs
    pub tag: String,
    pub asset: String,
    pub url: String,
}

fn install_one(
    rt: &Runtime,
    prompter: &dyn Prompter,
    input: &CliInput,
    batch_mode: bool,
) -> Result<()> {
    println!("{}", highlight(&input.label()));
    rt.paths.reset_tmp()?;

    let resolved = if input.is_github {
        resolve_github_asset(rt, prompter, input, batch_mode)?
    } else {
        ResolvedAsset {
            tag: String::new(),
            asset: input.asset.clone().unwrap_or_default(),
            url: input.download_url.clone(),
        }
    };

    let download_path = download_asset(rt, &resolved)?;
    let binary = install_downloaded(rt, prompter, input, &resolved, &download_path, batch_mode)?;

    println!(
        "✨ Successfully installed the {} binary in {}",
        highlight(&binary),
        highlight(&rt.paths.bin_path.display().to_string())
    );
    Ok(())
}

/// Pick the tag and asset of a GitHub input, asking when they cannot be resolved
pub fn resolve_github_asset(
    rt: &Runtime,
    prompter: &dyn Prompter,
    input: &CliInput,
    batch_mode: bool,
) -> Result<ResolvedAsset> {
    let project = fetch_project(rt, &input.owner, &input.repo)?;
    let tags = project.release_tags()?;

    let mut tag = match input.tag.as_deref() {
        None | Some("") | Some("latest") => project.latest_tag()?,
        Some(tag) => tag.to_string(),
    };
    if !tags.contains(&tag) {
        tag = select_or_fail(
            prompter,
            batch_mode,
            &format!("Could not find a release with the tag {tag} - please select a release:"),
            &tags,
        )?;
    }

    let assets = project.release_assets(&tag)?;
    let mut asset = match &input.asset {
        Some(asset) => asset.clone(),
        None => select_asset(&rt.os, &rt.arch, &assets, batch_mode, prompter)?,
    };
    if !assets.contains(&asset) {
        asset = select_or_fail(
            prompter,
            batch_mode,
            &format!("Could not find the asset {asset} - please select an asset:"),
            &assets,
        )?;
    }

    let url = project
        .download_url(&tag, &asset)
        .with_context(|| format!("Release {tag} has no download URL for {asset}"))?;
    debug!(%tag, %asset, %url, "resolved release asset");

    Ok(ResolvedAsset { tag, asset, url })
}

/// Download into the package store unless that asset is already there
fn download_asset(rt: &Runtime, resolved: &ResolvedAsset) -> Result<PathBuf> {
    let download_path = rt.paths.pkg_path.join(&resolved.asset);
    if download_path.exists() {
        return Err(StewError::AssetAlreadyDownloaded {
            asset: resolved.asset.clone(),
        }
        .into());
    }

    http::download_file(&rt.config, &resolved.url, &download_path)?;
    println!(
        "✅ Downloaded {} to {}",
        highlight(&resolved.asset),
        highlight(&rt.paths.pkg_path.display().to_string())
    );
    Ok(download_path)
}

/// Install an asset already in the package store and record it in the lockfile.
///
/// The downloaded asset is removed again if the installation fails.
pub fn install_downloaded(
    rt: &Runtime,
    prompter: &dyn Prompter,
    input: &CliInput,
    resolved: &ResolvedAsset,
    download_path: &Path,
    batch_mode: bool,
) -> Result<String> {
    let mut lockfile = LockFile::load(&rt.paths.lock_path, &rt.os, &rt.arch)?;

    let installed = install_binary(
        &rt.paths,
        prompter,
        &Installation {
            downloaded_file_path: download_path,
            repo: &input.repo,
            binary_name: input.binary_name.as_deref(),
            expected_binary_hash: input.binary_hash.as_deref(),
            batch_mode,
        },
        &mut lockfile,
        false,
    )
    .inspect_err(|_| {
        let _ = remove_path(download_path);
    })?;

    let record = if input.is_github {
        PackageData::github(
            &input.owner,
            &input.repo,
            &resolved.tag,
            &resolved.asset,
            &installed.name,
            &resolved.url,
            Some(installed.hash),
        )
    } else {
        PackageData::other(
            &resolved.asset,
            &installed.name,
            &resolved.url,
            Some(installed.hash),
        )
    };
    info!(binary = %record.binary, "recording package");
    lockfile.packages.push(record);
    lockfile.save(&rt.paths.lock_path)?;

    Ok(installed.name)
}
