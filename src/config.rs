use crate::lockfile::to_tab_indented_json;
use crate::prompt::Prompter;
use crate::utils::resolve_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "STEW_CONFIG_PATH";
/// GitHub API host used when the config does not name one
pub const DEFAULT_GITHUB_API: &str = "api.github.com";

const CONFIG_FILE_NAME: &str = "stew.config.json";

/// Host OS in the naming the lockfile uses (`darwin`, `linux`, `windows`, ...)
pub fn host_os() -> String {
    match std::env::consts::OS {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    }
}

/// Host architecture in the naming the lockfile uses (`amd64`, `arm64`, `386`, ...)
pub fn host_arch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "amd64".to_string(),
        "aarch64" => "arm64".to_string(),
        "x86" => "386".to_string(),
        other => other.to_string(),
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Could not determine home directory")
}

fn xdg_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Default top-level stew data directory
pub fn default_stew_path(os: &str) -> Result<PathBuf> {
    if os == "windows" {
        return Ok(home_dir()?.join("AppData").join("Local").join("stew"));
    }
    match xdg_dir("XDG_DATA_HOME") {
        Some(data_home) => Ok(data_home.join("stew")),
        None => Ok(home_dir()?.join(".local").join("share").join("stew")),
    }
}

/// Default directory binaries are installed into
pub fn default_bin_path(os: &str) -> Result<PathBuf> {
    if os == "windows" {
        return Ok(home_dir()?
            .join("AppData")
            .join("Local")
            .join("stew")
            .join("bin"));
    }
    Ok(home_dir()?.join(".local").join("bin"))
}

/// Location of `stew.config.json`
pub fn config_file_path(os: &str) -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if os == "windows" {
        return Ok(home_dir()?
            .join("AppData")
            .join("Local")
            .join("stew")
            .join("Config")
            .join(CONFIG_FILE_NAME));
    }
    match xdg_dir("XDG_CONFIG_HOME") {
        Some(config_home) => Ok(config_home.join("stew").join(CONFIG_FILE_NAME)),
        None => Ok(home_dir()?
            .join(".config")
            .join("stew")
            .join(CONFIG_FILE_NAME)),
    }
}

/// Contents of `stew.config.json`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stew_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stew_bin_path: String,
    #[serde(default, rename = "githubAPI", skip_serializing_if = "String::is_empty")]
    pub github_api: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub github_token: String,
    /// Binaries skipped by `upgrade --all`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_from_upgrade_all: Vec<String>,
}

impl Config {
    /// Read a config file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the config file, tab-indented
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, to_tab_indented_json(self)?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Fill empty path fields with the platform defaults
    pub fn with_defaults(mut self, os: &str) -> Result<Self> {
        if self.stew_path.is_empty() {
            self.stew_path = default_stew_path(os)?.to_string_lossy().to_string();
        }
        if self.stew_bin_path.is_empty() {
            self.stew_bin_path = default_bin_path(os)?.to_string_lossy().to_string();
        }
        Ok(self)
    }

    /// Host of the GitHub API
    pub fn github_api(&self) -> &str {
        if self.github_api.is_empty() {
            DEFAULT_GITHUB_API
        } else {
            &self.github_api
        }
    }

    /// Token from `GITHUB_TOKEN`, else the configured one
    pub fn github_token(&self) -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| (!self.github_token.is_empty()).then(|| self.github_token.clone()))
    }
}

/// Ask for the two stew directories, suggesting the current values
pub fn prompt_paths(
    prompter: &dyn Prompter,
    suggested_stew_path: &str,
    suggested_bin_path: &str,
) -> Result<(String, String)> {
    let stew_path = prompter.input(
        "Set the stewPath. This will contain all stew data other than the binaries.",
        suggested_stew_path,
    )?;
    let bin_path = prompter.input(
        "Set the stewBinPath. This is where the binaries will be installed by stew.",
        suggested_bin_path,
    )?;

    Ok((
        resolve_path(&stew_path)?.to_string_lossy().to_string(),
        resolve_path(&bin_path)?.to_string_lossy().to_string(),
    ))
}

/// Filesystem locations derived from the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StewPaths {
    pub stew_path: PathBuf,
    pub bin_path: PathBuf,
    /// Downloaded assets
    pub pkg_path: PathBuf,
    /// Scratch directory for extraction
    pub tmp_path: PathBuf,
    pub lock_path: PathBuf,
}

impl StewPaths {
    pub fn new(stew_path: impl Into<PathBuf>, bin_path: impl Into<PathBuf>) -> Self {
        let stew_path = stew_path.into();
        Self {
            pkg_path: stew_path.join("pkg"),
            tmp_path: stew_path.join("tmp"),
            lock_path: stew_path.join("Stewfile.lock.json"),
            bin_path: bin_path.into(),
            stew_path,
        }
    }

    /// Create the stew, package and bin directories
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.stew_path, &self.pkg_path, &self.bin_path] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Empty the scratch directory, leaving it in place
    pub fn reset_tmp(&self) -> Result<()> {
        if self.tmp_path.exists() {
            fs::remove_dir_all(&self.tmp_path).with_context(|| {
                format!("Failed to clear scratch directory: {}", self.tmp_path.display())
            })?;
        }
        fs::create_dir_all(&self.tmp_path).with_context(|| {
            format!("Failed to create scratch directory: {}", self.tmp_path.display())
        })
    }
}

/// Everything a command needs to know about the machine and stew's layout
#[derive(Debug, Clone)]
pub struct Runtime {
    pub os: String,
    pub arch: String,
    pub config: Config,
    pub paths: StewPaths,
}

impl Runtime {
    pub fn new(os: &str, arch: &str, config: Config) -> Self {
        let paths = StewPaths::new(&config.stew_path, &config.stew_bin_path);
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            config,
            paths,
        }
    }

    /// Load (or create) the config for this host and prepare stew's directories.
    ///
    /// A missing config is created from prompted paths when a prompter is
    /// given, otherwise from the defaults.
    pub fn initialize(prompter: Option<&dyn Prompter>) -> Result<Self> {
        let os = host_os();
        let arch = host_arch();
        let config_path = config_file_path(&os)?;

        let config = if config_path.exists() {
            debug!(path = %config_path.display(), "reading config");
            Config::read(&config_path)?.with_defaults(&os)?
        } else {
            let defaults = Config::default().with_defaults(&os)?;
            let config = match prompter {
                Some(prompter) => {
                    let (stew_path, stew_bin_path) =
                        prompt_paths(prompter, &defaults.stew_path, &defaults.stew_bin_path)?;
                    Config {
                        stew_path,
                        stew_bin_path,
                        ..defaults
                    }
                }
                None => defaults,
            };
            config.write(&config_path)?;
            println!("📄 Updated {}", config_path.display());
            config
        };

        let runtime = Self::new(&os, &arch, config);
        runtime.paths.ensure_dirs()?;
        warn_if_bin_not_in_path(&runtime.paths.bin_path);
        Ok(runtime)
    }
}

/// Print a hint when the install directory is not on PATH
pub fn warn_if_bin_not_in_path(bin_path: &Path) -> bool {
    let in_path = crate::install::utils::is_directory_in_path(bin_path);
    if !in_path {
        debug!(bin_path = %bin_path.display(), "install directory is not on PATH");
        println!(
            "WARNING: The stewBinPath {} is not in your PATH variable.\nAdd the following line to your ~/.zshrc or ~/.bashrc file then start a new terminal session:\n\nexport PATH=\"{}:$PATH\"\n",
            bin_path.display(),
            bin_path.display()
        );
    }
    in_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::{Answer, ScriptedPrompter};
    use tempfile::TempDir;

    #[test]
    fn test_host_names_use_lockfile_convention() {
        let os = host_os();
        let arch = host_arch();
        assert_ne!(os, "macos");
        assert_ne!(arch, "x86_64");
        assert_ne!(arch, "aarch64");
    }

    #[test]
    fn test_config_round_trip_and_field_names() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);
        let config = Config {
            stew_path: "/data/stew".to_string(),
            stew_bin_path: "/data/bin".to_string(),
            github_api: "github.example.com/api/v3".to_string(),
            github_token: String::new(),
            excluded_from_upgrade_all: vec!["fzf".to_string()],
        };

        config.write(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\t\"stewPath\": \"/data/stew\""));
        assert!(content.contains("\"stewBinPath\""));
        assert!(content.contains("\"githubAPI\""));
        assert!(content.contains("\"excludedFromUpgradeAll\""));
        assert!(!content.contains("githubToken"));

        assert_eq!(Config::read(&path).unwrap(), config);
    }

    #[test]
    fn test_with_defaults_only_fills_empty_fields() {
        let config = Config {
            stew_path: "/custom".to_string(),
            ..Default::default()
        }
        .with_defaults("linux")
        .unwrap();

        assert_eq!(config.stew_path, "/custom");
        assert!(config.stew_bin_path.ends_with("bin"));
        assert_eq!(config.github_api(), DEFAULT_GITHUB_API);
    }

    #[test]
    fn test_windows_defaults() {
        let stew_path = default_stew_path("windows").unwrap();
        assert!(stew_path.ends_with("AppData/Local/stew"));
        let bin_path = default_bin_path("windows").unwrap();
        assert!(bin_path.ends_with("AppData/Local/stew/bin"));
    }

    #[test]
    fn test_stew_paths_layout() {
        let paths = StewPaths::new("/data/stew", "/data/bin");
        assert_eq!(paths.pkg_path, PathBuf::from("/data/stew/pkg"));
        assert_eq!(paths.tmp_path, PathBuf::from("/data/stew/tmp"));
        assert_eq!(paths.lock_path, PathBuf::from("/data/stew/Stewfile.lock.json"));
        assert_eq!(paths.bin_path, PathBuf::from("/data/bin"));
    }

    #[test]
    fn test_reset_tmp_clears_leftovers() {
        let temp = TempDir::new().unwrap();
        let paths = StewPaths::new(temp.path().join("stew"), temp.path().join("bin"));
        paths.ensure_dirs().unwrap();

        fs::create_dir_all(paths.tmp_path.join("stale")).unwrap();
        fs::write(paths.tmp_path.join("stale").join("file"), "x").unwrap();

        paths.reset_tmp().unwrap();
        assert!(paths.tmp_path.is_dir());
        assert_eq!(fs::read_dir(&paths.tmp_path).unwrap().count(), 0);
    }

    #[test]
    fn test_prompt_paths_resolves_answers() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input("/opt/stew/".to_string()),
            Answer::Default,
        ]);
        let (stew_path, bin_path) = prompt_paths(&prompter, "/unused", "/usr/local/bin").unwrap();
        assert_eq!(stew_path, "/opt/stew");
        assert_eq!(bin_path, "/usr/local/bin");
        assert_eq!(prompter.seen_messages().len(), 2);
    }
}
