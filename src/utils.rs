use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extract filename from URL, ignoring any query string
pub fn get_filename_from_url(url: &str) -> String {
    url.split('?')
        .next()
        .unwrap_or(url)
        .trim_end_matches('/')
        .split('/')
        .next_back()
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// Resolve a user-entered path: strip quotes, expand `~` and `$VARS`, make absolute
pub fn resolve_path(input: &str) -> Result<PathBuf> {
    let unquoted = input.replace('"', "");
    let expanded = shellexpand::full(&unquoted)
        .with_context(|| format!("Failed to expand path: {unquoted}"))?;

    let mut path = PathBuf::from(expanded.trim_end_matches('/'));
    if !path.is_absolute() {
        path = std::env::current_dir()
            .context("Failed to get current directory")?
            .join(path);
    }
    Ok(path)
}

/// File name of a path as an owned string
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
