use crate::errors::StewError;
use crate::input::CliInput;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Where an installed package came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Github,
    #[default]
    Other,
}

/// One installed binary as recorded in `Stewfile.lock.json`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PackageData {
    pub source: Source,
    pub owner: String,
    pub repo: String,
    pub tag: String,
    pub asset: String,
    pub binary: String,
    pub url: String,
    /// SHA-256 of the installed binary
    #[serde(rename = "binaryHash", skip_serializing_if = "Option::is_none")]
    pub binary_hash: Option<String>,
}

impl PackageData {
    /// Record for a binary installed from a GitHub release
    pub fn github(
        owner: &str,
        repo: &str,
        tag: &str,
        asset: &str,
        binary: &str,
        url: &str,
        binary_hash: Option<String>,
    ) -> Self {
        Self {
            source: Source::Github,
            owner: owner.to_string(),
            repo: repo.to_string(),
            tag: tag.to_string(),
            asset: asset.to_string(),
            binary: binary.to_string(),
            url: url.to_string(),
            binary_hash,
        }
    }

    /// Record for a binary installed from a plain URL
    pub fn other(asset: &str, binary: &str, url: &str, binary_hash: Option<String>) -> Self {
        Self {
            source: Source::Other,
            asset: asset.to_string(),
            binary: binary.to_string(),
            url: url.to_string(),
            binary_hash,
            ..Default::default()
        }
    }

    /// Point an existing record at a newer release, keeping its binary name
    pub fn update_release(&mut self, tag: &str, asset: &str, url: &str, binary_hash: Option<String>) {
        self.tag = tag.to_string();
        self.asset = asset.to_string();
        self.url = url.to_string();
        if binary_hash.is_some() {
            self.binary_hash = binary_hash;
        }
    }

    /// Render this record as an install input that reproduces it
    pub fn to_cli_input(&self) -> CliInput {
        match self.source {
            Source::Github => CliInput {
                is_github: true,
                owner: self.owner.clone(),
                repo: self.repo.clone(),
                tag: non_empty(&self.tag),
                asset: non_empty(&self.asset),
                binary_name: non_empty(&self.binary),
                download_url: String::new(),
                binary_hash: self.binary_hash.clone(),
            },
            Source::Other => CliInput {
                is_github: false,
                owner: String::new(),
                repo: String::new(),
                tag: None,
                asset: non_empty(&self.asset),
                binary_name: non_empty(&self.binary),
                download_url: self.url.clone(),
                binary_hash: self.binary_hash.clone(),
            },
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// The persisted package registry
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LockFile {
    pub os: String,
    pub arch: String,
    pub packages: Vec<PackageData>,
}

impl LockFile {
    /// Empty registry tagged with the given platform
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            packages: Vec::new(),
        }
    }

    /// Read the lockfile, or synthesize an empty one when it does not exist yet
    pub fn load(path: &Path, os: &str, arch: &str) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "lockfile missing, starting empty");
            return Ok(Self::new(os, arch));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lockfile: {}", path.display()))?;
        let lock_file: LockFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse lockfile: {}", path.display()))?;

        debug!(
            path = %path.display(),
            packages = lock_file.packages.len(),
            "loaded lockfile"
        );
        Ok(lock_file)
    }

    /// Serialize the whole registry, tab-indented, replacing the file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let bytes = to_tab_indented_json(self)?;
        fs::write(path, bytes)
            .with_context(|| format!("Failed to write lockfile: {}", path.display()))?;

        println!("📄 Updated {}", path.display());
        Ok(())
    }

    /// Index of the record installed under `binary`
    pub fn find_binary(&self, binary: &str) -> Option<usize> {
        self.packages.iter().position(|pkg| pkg.binary == binary)
    }

    /// Remove the record at `index`
    pub fn remove_package(&mut self, index: usize) -> Result<PackageData, StewError> {
        if self.packages.is_empty() {
            return Err(StewError::NoPackagesInLockfile);
        }
        if index >= self.packages.len() {
            return Err(StewError::IndexOutOfBoundsInLockfile);
        }
        Ok(self.packages.remove(index))
    }

    /// Every record as a replayable install input
    pub fn to_cli_inputs(&self) -> Vec<CliInput> {
        self.packages.iter().map(PackageData::to_cli_input).collect()
    }
}

/// Pretty-print JSON with tab indentation
pub fn to_tab_indented_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize JSON")?;
    Ok(bytes)
}

/// Read a lockfile given as an install input and turn it into install inputs
pub fn read_lockfile_inputs(path: &Path) -> Result<Vec<CliInput>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lockfile: {}", path.display()))?;
    let lock_file: LockFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse lockfile: {}", path.display()))?;
    Ok(lock_file.to_cli_inputs())
}
