use crate::crypto::compute_sha256;
use crate::errors::StewError;
use crate::prompt::Prompter;
use crate::utils::base_name;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Check if a file is executable
pub fn is_executable(path: &Path) -> Result<bool> {
    let metadata = fs::metadata(path)?;

    if !metadata.is_file() {
        return Ok(false);
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension()
            && ext.to_string_lossy().to_lowercase() == "exe"
        {
            return Ok(true);
        }
        Ok(false)
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode();
        Ok(mode & 0o111 != 0)
    }
}

fn has_exe_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("exe"))
}

/// Every regular file under `root`, recursively, in a stable order
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// What the locator knows about the package being installed
#[derive(Debug, Clone, Copy)]
pub struct LocateContext<'a> {
    /// Directory the files were unpacked into; options are shown relative to it
    pub scratch_dir: &'a Path,
    pub repo: &'a str,
    /// Explicit install name, overriding whatever name is derived
    pub binary_name: Option<&'a str>,
    /// Hash of a previously installed binary, recognized when re-installing
    pub expected_hash: Option<&'a str>,
    pub batch_mode: bool,
}

/// The file chosen as the package's binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBinary {
    pub path: PathBuf,
    pub name: String,
    pub hash: String,
}

fn display_path(path: &Path, scratch_dir: &Path) -> String {
    path.strip_prefix(scratch_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// Pick the one binary among `files`.
///
/// Order of preference: a file matching the known hash, an executable named
/// after the repo, a `.exe`, the only executable. Anything else needs the user.
pub fn locate_binary(
    files: &[PathBuf],
    ctx: &LocateContext<'_>,
    prompter: &dyn Prompter,
) -> Result<LocatedBinary> {
    let (path, derived_name) = match find_candidate(files, ctx)? {
        Some(found) => found,
        None => choose_manually(files, ctx, prompter)?,
    };

    let name = ctx
        .binary_name
        .map(str::to_string)
        .unwrap_or(derived_name);
    let hash = compute_sha256(&path)?;
    debug!(binary = %path.display(), %name, "located binary");

    Ok(LocatedBinary { path, name, hash })
}

fn find_candidate(files: &[PathBuf], ctx: &LocateContext<'_>) -> Result<Option<(PathBuf, String)>> {
    if let (Some(name), Some(expected)) = (ctx.binary_name, ctx.expected_hash) {
        for file in files {
            if crate::crypto::hash_matches(file, expected)? {
                return Ok(Some((file.clone(), name.to_string())));
            }
        }
    }

    for file in files {
        if base_name(file) == ctx.repo && is_executable(file)? {
            return Ok(Some((file.clone(), ctx.repo.to_string())));
        }
    }

    if let Some(exe) = files.iter().find(|file| has_exe_extension(file)) {
        return Ok(Some((exe.clone(), base_name(exe))));
    }

    let mut executables = Vec::new();
    for file in files {
        if is_executable(file)? {
            executables.push(file);
        }
    }
    if let [only] = executables.as_slice() {
        return Ok(Some(((*only).clone(), base_name(only))));
    }

    debug!(executables = executables.len(), "no unique executable");
    Ok(None)
}

fn choose_manually(
    files: &[PathBuf],
    ctx: &LocateContext<'_>,
    prompter: &dyn Prompter,
) -> Result<(PathBuf, String)> {
    let options: Vec<String> = files
        .iter()
        .map(|file| display_path(file, ctx.scratch_dir))
        .collect();

    if ctx.batch_mode {
        return Err(StewError::CouldntDetectBinary { options }.into());
    }

    let choice = prompter.select(
        "Could not automatically detect the binary. Please select it manually:",
        &options,
    )?;
    let index = options
        .iter()
        .position(|option| *option == choice)
        .ok_or_else(|| anyhow::anyhow!("Selected file is not part of the package: {choice}"))?;
    let path = files[index].clone();

    let name = match ctx.binary_name {
        Some(name) => name.to_string(),
        None => prompter.input("Rename the binary?", &base_name(&path))?,
    };
    Ok((path, name))
}
