use crate::config::{
    Config, StewPaths, config_file_path, host_arch, host_os, prompt_paths, warn_if_bin_not_in_path,
};
use crate::lockfile::LockFile;
use crate::prompt::Prompter;
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// `stew config`
pub fn config(prompter: &dyn Prompter) -> Result<()> {
    let os = host_os();
    let config_path = config_file_path(&os)?;
    configure(prompter, &config_path, &os, &host_arch())?;
    Ok(())
}

/// Ask for the stew paths and the upgrade exclusions, then rewrite the config file
pub fn configure(
    prompter: &dyn Prompter,
    config_path: &Path,
    os: &str,
    arch: &str,
) -> Result<Config> {
    let current = if config_path.exists() {
        Config::read(config_path)?
    } else {
        debug!(path = %config_path.display(), "no config yet, suggesting defaults");
        Config::default()
    }
    .with_defaults(os)?;

    let (stew_path, stew_bin_path) =
        prompt_paths(prompter, &current.stew_path, &current.stew_bin_path)?;

    // Exclusions are offered from what the current stew path has installed
    let lock_path = StewPaths::new(&current.stew_path, &current.stew_bin_path).lock_path;
    let binaries: Vec<String> = LockFile::load(&lock_path, os, arch)?
        .packages
        .into_iter()
        .map(|pkg| pkg.binary)
        .collect();
    let excluded_from_upgrade_all = if binaries.is_empty() {
        current.excluded_from_upgrade_all.clone()
    } else {
        prompter.multi_select(
            "Select binaries to exclude from upgrade --all:",
            &binaries,
            &current.excluded_from_upgrade_all,
        )?
    };

    let updated = Config {
        stew_path,
        stew_bin_path,
        excluded_from_upgrade_all,
        ..current
    };
    updated.write(config_path)?;
    println!("📄 Updated {}", config_path.display());

    let paths = StewPaths::new(&updated.stew_path, &updated.stew_bin_path);
    paths.ensure_dirs()?;
    warn_if_bin_not_in_path(&paths.bin_path);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::PackageData;
    use crate::prompt::testing::{Answer, ScriptedPrompter};
    use tempfile::TempDir;

    #[test]
    fn test_first_run_writes_prompted_paths() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config").join("stew.config.json");
        let stew_path = temp.path().join("data").to_string_lossy().to_string();
        let bin_path = temp.path().join("bin").to_string_lossy().to_string();
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(stew_path.clone()),
            Answer::Input(bin_path.clone()),
        ]);

        let config = configure(&prompter, &config_path, "linux", "amd64").unwrap();

        assert_eq!(config.stew_path, stew_path);
        assert_eq!(config.stew_bin_path, bin_path);
        assert_eq!(Config::read(&config_path).unwrap(), config);
        assert!(temp.path().join("data").join("pkg").is_dir());
    }

    #[test]
    fn test_exclusions_are_picked_from_installed_binaries() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("stew.config.json");
        let existing = Config {
            stew_path: temp.path().join("data").to_string_lossy().to_string(),
            stew_bin_path: temp.path().join("bin").to_string_lossy().to_string(),
            github_token: "secret".to_string(),
            ..Default::default()
        };
        existing.write(&config_path).unwrap();

        let mut lockfile = LockFile::new("linux", "amd64");
        lockfile
            .packages
            .push(PackageData::other("a.zip", "a", "https://example.com/a.zip", None));
        lockfile
            .packages
            .push(PackageData::other("b.zip", "b", "https://example.com/b.zip", None));
        lockfile
            .save(&temp.path().join("data").join("Stewfile.lock.json"))
            .unwrap();

        let prompter = ScriptedPrompter::new(vec![
            Answer::Default,
            Answer::Default,
            Answer::MultiSelect(vec!["b".to_string()]),
        ]);
        let config = configure(&prompter, &config_path, "linux", "amd64").unwrap();

        assert_eq!(config.excluded_from_upgrade_all, vec!["b".to_string()]);
        assert_eq!(config.github_token, "secret");
        assert_eq!(config.stew_path, existing.stew_path);
        assert_eq!(
            prompter.seen_options().last().unwrap(),
            &vec!["a".to_string(), "b".to_string()]
        );
    }
}
