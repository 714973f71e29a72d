use crate::errors::StewError;
use crate::utils::get_filename_from_url;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// `owner/repo[@tag][::asset][!!binary]`
static GITHUB_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([A-Za-z0-9\-]+)/([A-Za-z0-9_.\-]+)(?:@([A-Za-z0-9_.\-]+))?(?:::([A-Za-z0-9_.\-+]+))?(?:!!([A-Za-z0-9_.\-]+))?$",
    )
    .expect("github input pattern is valid")
});

static URL_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(http|ftp|https)://([\w_-]+(?:(?:\.[\w_-]+)+))([\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-])",
    )
    .expect("url input pattern is valid")
});

/// A single package request, from the command line, a Stewfile or a lockfile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliInput {
    pub is_github: bool,
    pub owner: String,
    pub repo: String,
    pub tag: Option<String>,
    pub asset: Option<String>,
    /// Explicit name to install the binary as
    pub binary_name: Option<String>,
    /// Only set for URL inputs; GitHub inputs resolve it from the release
    pub download_url: String,
    /// Known hash of the binary, when replaying a lockfile
    pub binary_hash: Option<String>,
}

impl CliInput {
    /// Short label for status output
    pub fn label(&self) -> String {
        if self.is_github {
            format!("{}/{}", self.owner, self.repo)
        } else {
            self.asset.clone().unwrap_or_else(|| self.download_url.clone())
        }
    }
}

/// Make sure a positional argument was actually given
pub fn validate_cli_input(cli_input: &str) -> Result<(), StewError> {
    if cli_input.trim().is_empty() {
        return Err(StewError::EmptyCliInput);
    }
    Ok(())
}

/// Parse a GitHub or URL install input
pub fn parse_cli_input(cli_input: &str) -> Result<CliInput, StewError> {
    validate_cli_input(cli_input)?;
    let trimmed = cli_input.trim();

    if let Some(captures) = GITHUB_INPUT.captures(trimmed) {
        let group = |i: usize| captures.get(i).map(|m| m.as_str().to_string());
        return Ok(CliInput {
            is_github: true,
            owner: group(1).unwrap_or_default(),
            repo: group(2).unwrap_or_default(),
            tag: group(3),
            asset: group(4),
            binary_name: group(5),
            ..Default::default()
        });
    }

    // URLs may carry a `!!binary` suffix too
    let (url, binary_name) = match trimmed.rsplit_once("!!") {
        Some((url, name)) if !name.is_empty() => (url, Some(name.to_string())),
        _ => (trimmed, None),
    };

    if URL_INPUT.is_match(url) {
        return Ok(CliInput {
            is_github: false,
            asset: Some(get_filename_from_url(url)),
            binary_name,
            download_url: url.to_string(),
            ..Default::default()
        });
    }

    Err(StewError::UnrecognizedInput {
        input: trimmed.to_string(),
    })
}

/// Read a Stewfile: one install input per line
pub fn read_stewfile_contents(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read Stewfile: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
