use super::{Codec, decoder};
use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;
use tar::Archive;

/// Extract a (possibly compressed) tar archive, keeping directories and mode bits
pub fn extract_tar(tar_path: &Path, codec: Codec, extract_to: &Path) -> Result<()> {
    let file = fs::File::open(tar_path)
        .with_context(|| format!("Failed to open tar file: {}", tar_path.display()))?;

    let reader = decoder(codec, file)
        .with_context(|| format!("Failed to decode: {}", tar_path.display()))?;
    let count = extract_tar_from_reader(reader, extract_to)
        .with_context(|| format!("Failed to extract: {}", tar_path.display()))?;

    println!("📦 Extracted {count} entries from {}", crate::utils::base_name(tar_path));
    Ok(())
}

/// Unpack every entry of a tar stream under `extract_to`, returning the entry count
fn extract_tar_from_reader<R: Read>(reader: R, extract_to: &Path) -> Result<usize> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);

    let mut extracted = 0;
    for entry in archive.entries().context("Failed to read tar entries")? {
        let mut entry = entry.context("Failed to access tar entry")?;
        let entry_path = entry
            .path()
            .context("Failed to get entry path")?
            .to_path_buf();

        // unpack_in refuses entries escaping the destination
        let unpacked = entry
            .unpack_in(extract_to)
            .with_context(|| format!("Failed to extract entry: {}", entry_path.display()))?;
        if unpacked {
            extracted += 1;
        }
    }

    Ok(extracted)
}
