//! Picking the release asset that matches the host platform.
//!
//! OS and arch values use the Go-style names recorded in the lockfile
//! (`darwin`, `linux`, `windows`; `amd64`, `arm64`, `386`).

use crate::errors::StewError;
use crate::prompt::Prompter;
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static CHECKSUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.(sha\d+|md5)(sums?)?|sha\d+sums?(\.txt)?|checksums?\.txt)$")
        .expect("checksum pattern is valid")
});

static DARWIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(darwin|mac(os)?|apple|osx)").expect("darwin pattern is valid")
});

static WINDOWS: LazyLock<Regex> = LazyLock::new(|| {
    // `win` must not match inside `darwin`
    Regex::new(r"(?i)(windows|(^|[^a-z])win|\.msi$|\.exe$)").expect("windows pattern is valid")
});

static ARM64: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(arm64e?|aarch64)").expect("arm64 pattern is valid"));

static AMD64: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(x86_64|amd64|x64)").expect("amd64 pattern is valid"));

static I386: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(i?386|x86_32|amd32|x32)").expect("386 pattern is valid")
});

/// Outcome of automatic asset detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Detected(String),
    /// Zero or several candidates survived filtering
    Ambiguous { candidates: Vec<String> },
}

/// Whether an asset name looks like a checksum file
pub fn is_checksum_file(name: &str) -> bool {
    CHECKSUM.is_match(name)
}

fn os_pattern(os: &str) -> Regex {
    match os {
        "darwin" => DARWIN.clone(),
        "windows" => WINDOWS.clone(),
        other => literal_pattern(other),
    }
}

fn arch_pattern(arch: &str) -> Regex {
    match arch {
        "arm64" => ARM64.clone(),
        "amd64" => AMD64.clone(),
        "386" => I386.clone(),
        other => literal_pattern(other),
    }
}

fn literal_pattern(value: &str) -> Regex {
    Regex::new(&format!("(?i){}", regex::escape(value)))
        .expect("escaped literal is always a valid pattern")
}

fn filter_matching<'a>(assets: &[&'a str], pattern: &Regex) -> Vec<&'a str> {
    assets
        .iter()
        .copied()
        .filter(|asset| pattern.is_match(asset))
        .collect()
}

/// Narrow a release's assets down to the one built for `os`/`arch`
pub fn detect_asset(os: &str, arch: &str, release_assets: &[String]) -> Resolution {
    let candidates: Vec<&str> = release_assets
        .iter()
        .map(String::as_str)
        .filter(|name| !is_checksum_file(name))
        .collect();

    let os_matches = filter_matching(&candidates, &os_pattern(os));
    let final_matches = filter_matching(&os_matches, &arch_pattern(arch));
    debug!(?os_matches, ?final_matches, "asset detection for {os}/{arch}");

    if let [only] = final_matches.as_slice() {
        return Resolution::Detected(only.to_string());
    }

    // Apple silicon runs amd64 builds under Rosetta
    if os == "darwin" && arch == "arm64" {
        let rosetta_matches = filter_matching(&os_matches, &AMD64);
        if let [only] = rosetta_matches.as_slice() {
            debug!(asset = only, "using amd64 asset on darwin/arm64");
            return Resolution::Detected(only.to_string());
        }
    }

    Resolution::Ambiguous {
        candidates: final_matches.into_iter().map(str::to_string).collect(),
    }
}

/// Detect the asset, falling back to a manual pick over the full, unfiltered list
pub fn select_asset(
    os: &str,
    arch: &str,
    release_assets: &[String],
    batch_mode: bool,
    prompter: &dyn Prompter,
) -> Result<String> {
    match detect_asset(os, arch, release_assets) {
        Resolution::Detected(asset) => Ok(asset),
        Resolution::Ambiguous { .. } if batch_mode => Err(StewError::AmbiguousAssetSelection {
            options: release_assets.to_vec(),
        }
        .into()),
        Resolution::Ambiguous { .. } => prompter.select(
            "Could not automatically detect the release asset matching your OS/Arch. Please select it manually:",
            release_assets,
        ),
    }
}
