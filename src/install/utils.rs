use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Copy `source` to `dest`, replacing any existing file, and mark it executable
pub fn copy_executable(source: &Path, dest: &Path) -> Result<()> {
    // Removing first avoids "Text file busy" when replacing a running binary
    if dest.exists() {
        fs::remove_file(dest)
            .with_context(|| format!("Failed to remove existing file: {}", dest.display()))?;
    }

    fs::copy(source, dest).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), dest.display())
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(0o755))
            .context("Failed to set executable permissions")?;
    }

    Ok(())
}

/// Remove a file or directory if it exists
pub fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    } else if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Check if a directory is in PATH
pub fn is_directory_in_path(directory: &Path) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    let wanted = directory.canonicalize().unwrap_or_else(|_| directory.to_path_buf());

    std::env::split_paths(&path_var).any(|entry| {
        let entry = entry.canonicalize().unwrap_or(entry);
        entry == wanted
    })
}
