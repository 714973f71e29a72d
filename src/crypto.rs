use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

/// SHA-256 of a file as lowercase hex; this is the lockfile's `binaryHash`
pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = fs::File::open(file_path)
        .with_context(|| format!("Failed to open file for hashing: {}", file_path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read file for hashing: {}", file_path.display()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether a file hashes to `expected` (case-insensitive hex)
pub fn hash_matches(file_path: &Path, expected: &str) -> Result<bool> {
    Ok(compute_sha256(file_path)? == expected.to_lowercase())
}
