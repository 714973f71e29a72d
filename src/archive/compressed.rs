use super::{Codec, decoder};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name a single compressed file decompresses to: its name minus the last extension
pub fn decompressed_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// Decompress a single-file stream into `extract_to`; the result is the payload, marked executable
pub fn extract_single(path: &Path, codec: Codec, extract_to: &Path) -> Result<PathBuf> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open compressed file: {}", path.display()))?;
    let mut reader = decoder(codec, file)?;

    let outpath = extract_to.join(decompressed_name(&crate::utils::base_name(path)));
    let mut outfile = fs::File::create(&outpath)
        .with_context(|| format!("Failed to create file: {}", outpath.display()))?;
    std::io::copy(&mut reader, &mut outfile)
        .with_context(|| format!("Failed to decompress: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&outpath, fs::Permissions::from_mode(0o755))
            .context("Failed to set executable permissions")?;
    }

    println!("📦 Decompressed {}", crate::utils::base_name(&outpath));
    Ok(outpath)
}
