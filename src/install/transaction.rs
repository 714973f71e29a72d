//! Turning a downloaded asset into an installed binary.
//!
//! The transaction unpacks the asset into the scratch directory, picks the
//! binary, settles any clash with an installed binary of the same name and
//! copies it into the bin directory. The lockfile is mutated in memory only;
//! callers save it once the transaction succeeds.

use crate::archive;
use crate::config::StewPaths;
use crate::errors::StewError;
use crate::install::executable::{LocateContext, LocatedBinary, locate_binary, walk_files};
use crate::install::utils::{copy_executable, remove_path};
use crate::lockfile::LockFile;
use crate::prompt::Prompter;
use crate::utils::base_name;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A downloaded asset waiting to be installed
#[derive(Debug, Clone, Copy)]
pub struct Installation<'a> {
    /// Asset file inside the package store
    pub downloaded_file_path: &'a Path,
    pub repo: &'a str,
    /// Explicit install name (`!!name` inputs, upgrades)
    pub binary_name: Option<&'a str>,
    /// Hash of the binary picked on a previous install
    pub expected_binary_hash: Option<&'a str>,
    pub batch_mode: bool,
}

/// Outcome of a committed installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    pub name: String,
    pub hash: String,
}

/// Install the binary contained in `installation.downloaded_file_path`.
///
/// On a name clash the previous binary is replaced when upgrading or in batch
/// mode, otherwise the user is asked. When a plain install replaces a binary,
/// its old record is removed here so the caller can append a fresh one; an
/// upgrade leaves the record for the caller to update in place.
pub fn install_binary(
    paths: &StewPaths,
    prompter: &dyn Prompter,
    installation: &Installation<'_>,
    lockfile: &mut LockFile,
    overwrite_from_upgrade: bool,
) -> Result<InstalledBinary> {
    extract_payload(paths, prompter, installation)?;

    let files = walk_files(&paths.tmp_path)?;
    let located = locate_binary(
        &files,
        &LocateContext {
            scratch_dir: &paths.tmp_path,
            repo: installation.repo,
            binary_name: installation.binary_name,
            expected_hash: installation.expected_binary_hash,
            batch_mode: installation.batch_mode,
        },
        prompter,
    )?;

    handle_existing_binary(
        paths,
        prompter,
        installation,
        lockfile,
        &located.name,
        overwrite_from_upgrade,
    )?;

    commit(paths, &located)?;

    Ok(InstalledBinary {
        name: located.name,
        hash: located.hash,
    })
}

/// Unpack an archive, or stage a raw download under its install name
fn extract_payload(
    paths: &StewPaths,
    prompter: &dyn Prompter,
    installation: &Installation<'_>,
) -> Result<()> {
    let downloaded = installation.downloaded_file_path;
    fs::create_dir_all(&paths.tmp_path).with_context(|| {
        format!("Failed to create scratch directory: {}", paths.tmp_path.display())
    })?;

    let file_name = base_name(downloaded);
    if archive::is_archive(&file_name) {
        return archive::unpack(downloaded, &paths.tmp_path);
    }

    let staged_name = match installation.binary_name {
        Some(name) => name.to_string(),
        None if installation.batch_mode => file_name,
        None => prompter.input("Rename the binary?", &file_name)?,
    };
    debug!(%staged_name, "staging raw download");
    copy_executable(downloaded, &paths.tmp_path.join(staged_name))
}

fn handle_existing_binary(
    paths: &StewPaths,
    prompter: &dyn Prompter,
    installation: &Installation<'_>,
    lockfile: &mut LockFile,
    binary_name: &str,
    overwrite_from_upgrade: bool,
) -> Result<()> {
    let Some(index) = lockfile.find_binary(binary_name) else {
        return Ok(());
    };

    if !overwrite_from_upgrade && !installation.batch_mode {
        let message = format!(
            "The binary {binary_name} version: {} is already installed, would you like to overwrite it?",
            lockfile.packages[index].tag
        );
        let overwrite = match prompter.confirm(&message) {
            Ok(yes) => yes,
            // A cancelled prompt counts as a "no"
            Err(err)
                if matches!(
                    err.downcast_ref::<StewError>(),
                    Some(StewError::PromptCancelled { .. })
                ) =>
            {
                false
            }
            Err(err) => {
                discard_download(paths, installation)?;
                return Err(err);
            }
        };
        if !overwrite {
            discard_download(paths, installation)?;
            return Err(StewError::AbortBinaryOverwrite {
                binary: binary_name.to_string(),
            }
            .into());
        }
    }

    overwrite_binary(
        paths,
        lockfile,
        index,
        installation.downloaded_file_path,
        overwrite_from_upgrade,
    )
}

fn discard_download(paths: &StewPaths, installation: &Installation<'_>) -> Result<()> {
    remove_path(installation.downloaded_file_path)?;
    remove_path(&paths.tmp_path)
}

fn overwrite_binary(
    paths: &StewPaths,
    lockfile: &mut LockFile,
    index: usize,
    new_asset_path: &Path,
    overwrite_from_upgrade: bool,
) -> Result<()> {
    let previous_asset_path = paths.pkg_path.join(&lockfile.packages[index].asset);
    if previous_asset_path != new_asset_path {
        remove_path(&previous_asset_path)?;
    }

    if !overwrite_from_upgrade {
        let removed = lockfile.remove_package(index)?;
        info!(binary = %removed.binary, "replacing installed package");
    }
    Ok(())
}

fn commit(paths: &StewPaths, located: &LocatedBinary) -> Result<()> {
    copy_executable(&located.path, &paths.bin_path.join(&located.name))?;
    fs::remove_dir_all(&paths.tmp_path).with_context(|| {
        format!("Failed to clear scratch directory: {}", paths.tmp_path.display())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::PackageData;
    use crate::prompt::testing::{Answer, ScriptedPrompter};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StewPaths) {
        let temp = TempDir::new().unwrap();
        let paths = StewPaths::new(temp.path().join("stew"), temp.path().join("bin"));
        paths.ensure_dirs().unwrap();
        paths.reset_tmp().unwrap();
        (temp, paths)
    }

    /// Tarball in the package store holding an executable and a license
    fn tarball(paths: &StewPaths, asset: &str, binary: &str, content: &[u8]) -> std::path::PathBuf {
        let path = paths.pkg_path.join(asset);
        let encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, binary, content).unwrap();

        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "LICENSE", &b"mit"[..]).unwrap();

        builder.into_inner().unwrap().finish().unwrap();
        path
    }

    fn installation<'a>(path: &'a Path, repo: &'a str, batch_mode: bool) -> Installation<'a> {
        Installation {
            downloaded_file_path: path,
            repo,
            binary_name: None,
            expected_binary_hash: None,
            batch_mode,
        }
    }

    fn existing_foo(paths: &StewPaths) -> LockFile {
        fs::write(paths.pkg_path.join("foo-v1.tar.gz"), "old asset").unwrap();
        fs::write(paths.bin_path.join("foo"), "old binary").unwrap();
        let mut lockfile = LockFile::new("linux", "amd64");
        lockfile.packages.push(PackageData::github(
            "o",
            "foo",
            "v1",
            "foo-v1.tar.gz",
            "foo",
            "https://example.com/foo-v1.tar.gz",
            None,
        ));
        lockfile
    }

    #[cfg(unix)]
    #[test]
    fn test_fresh_install_commits_binary() {
        let (_temp, paths) = setup();
        let asset = tarball(&paths, "app-v1-linux-amd64.tar.gz", "app", b"app v1");
        let mut lockfile = LockFile::new("linux", "amd64");

        let installed = install_binary(
            &paths,
            &ScriptedPrompter::new(vec![]),
            &installation(&asset, "app", true),
            &mut lockfile,
            false,
        )
        .unwrap();

        assert_eq!(installed.name, "app");
        assert_eq!(fs::read(paths.bin_path.join("app")).unwrap(), b"app v1");
        assert!(!paths.tmp_path.exists());
        assert!(asset.exists());
        assert!(lockfile.packages.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_raw_download_uses_prompted_name() {
        let (_temp, paths) = setup();
        let asset = paths.pkg_path.join("tool-linux-amd64");
        fs::write(&asset, "raw binary").unwrap();
        let prompter = ScriptedPrompter::new(vec![Answer::Input("tool".to_string())]);
        let mut lockfile = LockFile::new("linux", "amd64");

        let installed = install_binary(
            &paths,
            &prompter,
            &installation(&asset, "", false),
            &mut lockfile,
            false,
        )
        .unwrap();

        assert_eq!(installed.name, "tool");
        assert_eq!(fs::read(paths.bin_path.join("tool")).unwrap(), b"raw binary");
    }

    #[cfg(unix)]
    #[test]
    fn test_raw_download_batch_mode_keeps_base_name() {
        let (_temp, paths) = setup();
        let asset = paths.pkg_path.join("tool-linux-amd64");
        fs::write(&asset, "raw binary").unwrap();
        let mut lockfile = LockFile::new("linux", "amd64");

        let installed = install_binary(
            &paths,
            &ScriptedPrompter::new(vec![]),
            &installation(&asset, "", true),
            &mut lockfile,
            false,
        )
        .unwrap();

        assert_eq!(installed.name, "tool-linux-amd64");
        assert!(paths.bin_path.join("tool-linux-amd64").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_declined_overwrite_leaves_state_untouched() {
        let (_temp, paths) = setup();
        let mut lockfile = existing_foo(&paths);
        let before = lockfile.clone();
        let asset = tarball(&paths, "foo-v2.tar.gz", "foo", b"foo v2");
        let prompter = ScriptedPrompter::new(vec![Answer::Confirm(false)]);

        let err = install_binary(
            &paths,
            &prompter,
            &installation(&asset, "foo", false),
            &mut lockfile,
            false,
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<StewError>(),
            Some(&StewError::AbortBinaryOverwrite {
                binary: "foo".to_string()
            })
        );
        assert_eq!(lockfile, before);
        assert!(!asset.exists());
        assert!(!paths.tmp_path.exists());
        assert_eq!(fs::read_to_string(paths.bin_path.join("foo")).unwrap(), "old binary");
        assert!(paths.pkg_path.join("foo-v1.tar.gz").exists());
        assert!(prompter.seen_messages()[0].contains("version: v1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancelled_overwrite_prompt_aborts() {
        let (_temp, paths) = setup();
        let mut lockfile = existing_foo(&paths);
        let asset = tarball(&paths, "foo-v2.tar.gz", "foo", b"foo v2");

        let err = install_binary(
            &paths,
            &ScriptedPrompter::new(vec![Answer::Cancel]),
            &installation(&asset, "foo", false),
            &mut lockfile,
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StewError>(),
            Some(StewError::AbortBinaryOverwrite { .. })
        ));
        assert_eq!(lockfile.packages.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_overwrite_prompt_is_not_a_decline() {
        let (_temp, paths) = setup();
        let mut lockfile = existing_foo(&paths);
        let before = lockfile.clone();
        let asset = tarball(&paths, "foo-v2.tar.gz", "foo", b"foo v2");

        let err = install_binary(
            &paths,
            &ScriptedPrompter::new(vec![Answer::Fail("terminal went away".to_string())]),
            &installation(&asset, "foo", false),
            &mut lockfile,
            false,
        )
        .unwrap_err();

        assert!(err.downcast_ref::<StewError>().is_none());
        assert!(err.to_string().contains("terminal went away"));
        assert_eq!(lockfile, before);
        assert!(!asset.exists());
        assert!(!paths.tmp_path.exists());
        assert_eq!(fs::read_to_string(paths.bin_path.join("foo")).unwrap(), "old binary");
    }

    #[cfg(unix)]
    #[test]
    fn test_accepted_overwrite_removes_old_record_and_asset() {
        let (_temp, paths) = setup();
        let mut lockfile = existing_foo(&paths);
        let asset = tarball(&paths, "foo-v2.tar.gz", "foo", b"foo v2");

        install_binary(
            &paths,
            &ScriptedPrompter::new(vec![Answer::Confirm(true)]),
            &installation(&asset, "foo", false),
            &mut lockfile,
            false,
        )
        .unwrap();

        assert!(lockfile.packages.is_empty());
        assert!(!paths.pkg_path.join("foo-v1.tar.gz").exists());
        assert!(asset.exists());
        assert_eq!(fs::read(paths.bin_path.join("foo")).unwrap(), b"foo v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_mode_overwrites_without_prompt() {
        let (_temp, paths) = setup();
        let mut lockfile = existing_foo(&paths);
        let asset = tarball(&paths, "foo-v2.tar.gz", "foo", b"foo v2");

        install_binary(
            &paths,
            &ScriptedPrompter::new(vec![]),
            &installation(&asset, "foo", true),
            &mut lockfile,
            false,
        )
        .unwrap();

        assert!(lockfile.packages.is_empty());
        assert_eq!(fs::read(paths.bin_path.join("foo")).unwrap(), b"foo v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_upgrade_updates_record_in_place() {
        let (_temp, paths) = setup();
        let mut lockfile = existing_foo(&paths);
        let asset = tarball(&paths, "foo-v2.tar.gz", "foo", b"foo v2");

        let installed = install_binary(
            &paths,
            &ScriptedPrompter::new(vec![]),
            &Installation {
                binary_name: Some("foo"),
                ..installation(&asset, "foo", false)
            },
            &mut lockfile,
            true,
        )
        .unwrap();

        assert_eq!(lockfile.packages.len(), 1);
        lockfile.packages[0].update_release(
            "v2",
            "foo-v2.tar.gz",
            "https://example.com/foo-v2.tar.gz",
            Some(installed.hash.clone()),
        );

        assert_eq!(lockfile.packages.len(), 1);
        assert_eq!(lockfile.packages[0].binary, "foo");
        assert_eq!(lockfile.packages[0].tag, "v2");
        assert!(!paths.pkg_path.join("foo-v1.tar.gz").exists());
        assert_eq!(fs::read(paths.bin_path.join("foo")).unwrap(), b"foo v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_reinstall_of_same_asset_keeps_it() {
        let (_temp, paths) = setup();
        let asset = tarball(&paths, "foo-v1.tar.gz", "foo", b"foo v1");
        let mut lockfile = LockFile::new("linux", "amd64");
        lockfile.packages.push(PackageData::github(
            "o", "foo", "v1", "foo-v1.tar.gz", "foo", "https://example.com", None,
        ));

        install_binary(
            &paths,
            &ScriptedPrompter::new(vec![]),
            &installation(&asset, "foo", true),
            &mut lockfile,
            false,
        )
        .unwrap();

        assert!(asset.exists());
    }

    #[test]
    fn test_unpack_failure_leaves_scratch_dir() {
        let (_temp, paths) = setup();
        let asset = paths.pkg_path.join("broken.tar.gz");
        fs::write(&asset, "garbage").unwrap();
        let mut lockfile = LockFile::new("linux", "amd64");

        let result = install_binary(
            &paths,
            &ScriptedPrompter::new(vec![]),
            &installation(&asset, "broken", true),
            &mut lockfile,
            false,
        );

        assert!(result.is_err());
        assert!(paths.tmp_path.exists());
        assert!(lockfile.packages.is_empty());
    }
}
