use crate::config::Config;
use crate::errors::StewError;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

const USER_AGENT: &str = concat!("stew/", env!("CARGO_PKG_VERSION"));

/// Issue a GET, adding GitHub headers when `url` points at the configured API host
fn get(config: &Config, url: &str, accept: &str) -> Result<ureq::Response> {
    let mut request = ureq::get(url).set("User-Agent", USER_AGENT);

    if url.contains(config.github_api()) {
        request = request.set("Accept", accept);
        if let Some(token) = config.github_token() {
            request = request.set("Authorization", &format!("token {token}"));
        }
    }

    debug!(url, "GET");
    match request.call() {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, _)) => Err(StewError::NonZeroStatusCode { status }.into()),
        Err(err) => Err(err).with_context(|| format!("Failed to request: {url}")),
    }
}

/// Fetch and decode a JSON document
pub fn get_json<T: DeserializeOwned>(config: &Config, url: &str) -> Result<T> {
    get(config, url, "application/vnd.github.v3+json")?
        .into_json()
        .with_context(|| format!("Failed to parse JSON from: {url}"))
}

fn progress_bar(total: Option<u64>, file_name: &str) -> Result<ProgressBar> {
    let bar = match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                    .context("Invalid progress bar template")?
                    .progress_chars("█▓░"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.blue} {msg} {bytes}")
                    .context("Invalid progress bar template")?,
            );
            bar
        }
    };
    bar.set_message(format!("⬇️  Downloading {file_name}"));
    Ok(bar)
}

/// Download `url` to `path` through a temporary file in the same directory
pub fn download_file(config: &Config, url: &str, path: &Path) -> Result<()> {
    let response = get(config, url, "application/octet-stream")?;
    let total = response
        .header("Content-Length")
        .and_then(|len| len.parse::<u64>().ok());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("download")
    ));

    let mut temp_file = fs::File::create(&temp_path)
        .with_context(|| format!("Failed to create temporary file: {}", temp_path.display()))?;

    let bar = progress_bar(total, &crate::utils::base_name(path))?;
    let mut reader = bar.wrap_read(response.into_reader());
    let copied = std::io::copy(&mut reader, &mut temp_file);
    bar.finish_and_clear();

    copied.with_context(|| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to write to temporary file: {}", temp_path.display())
    })?;

    temp_file.sync_all().with_context(|| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to sync temporary file: {}", temp_path.display())
    })?;
    drop(temp_file);

    fs::rename(&temp_path, path).with_context(|| {
        let _ = fs::remove_file(&temp_path);
        format!(
            "Failed to move temporary file to final location: {} -> {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
