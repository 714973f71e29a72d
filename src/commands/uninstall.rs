use super::{check_flag_and_input, delete_asset_and_binary, load_installed};
use crate::config::Runtime;
use crate::errors::StewError;
use crate::render::highlight;
use anyhow::Result;
use tracing::info;

/// `stew uninstall`
pub fn uninstall(rt: &Runtime, binary: Option<&str>, all: bool) -> Result<()> {
    check_flag_and_input(all, binary)?;
    let mut lockfile = load_installed(rt)?;

    if all {
        for pkg in &lockfile.packages {
            delete_asset_and_binary(&rt.paths, &pkg.asset, &pkg.binary)?;
            info!(binary = %pkg.binary, "uninstalled");
        }
        let count = lockfile.packages.len();
        lockfile.packages.clear();
        lockfile.save(&rt.paths.lock_path)?;
        println!("✨ Successfully uninstalled {count} binaries");
        return Ok(());
    }

    let binary = binary.unwrap_or_default();
    let index = lockfile
        .find_binary(binary)
        .ok_or_else(|| StewError::BinaryNotInstalled {
            binary: binary.to_string(),
        })?;

    let pkg = &lockfile.packages[index];
    delete_asset_and_binary(&rt.paths, &pkg.asset, &pkg.binary)?;
    lockfile.remove_package(index)?;
    lockfile.save(&rt.paths.lock_path)?;

    println!(
        "✨ Successfully uninstalled the {} binary from {}",
        highlight(binary),
        highlight(&rt.paths.bin_path.display().to_string())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::runtime;
    use crate::lockfile::{LockFile, PackageData};
    use std::fs;

    fn install_fake(rt: &Runtime, binaries: &[&str]) {
        let mut lockfile = LockFile::new("linux", "amd64");
        for binary in binaries {
            let asset = format!("{binary}.tar.gz");
            fs::write(rt.paths.pkg_path.join(&asset), "asset").unwrap();
            fs::write(rt.paths.bin_path.join(binary), "bin").unwrap();
            lockfile.packages.push(PackageData::github(
                "owner",
                binary,
                "v1",
                &asset,
                binary,
                "https://example.com/asset",
                None,
            ));
        }
        lockfile.save(&rt.paths.lock_path).unwrap();
    }

    #[test]
    fn test_uninstall_one() {
        let (_temp, rt) = runtime();
        install_fake(&rt, &["fzf", "rg"]);

        uninstall(&rt, Some("fzf"), false).unwrap();

        assert!(!rt.paths.bin_path.join("fzf").exists());
        assert!(!rt.paths.pkg_path.join("fzf.tar.gz").exists());
        assert!(rt.paths.bin_path.join("rg").exists());
        let lockfile = LockFile::load(&rt.paths.lock_path, "linux", "amd64").unwrap();
        assert_eq!(lockfile.packages.len(), 1);
        assert_eq!(lockfile.packages[0].binary, "rg");
    }

    #[test]
    fn test_uninstall_all() {
        let (_temp, rt) = runtime();
        install_fake(&rt, &["fzf", "rg"]);

        uninstall(&rt, None, true).unwrap();

        assert!(fs::read_dir(&rt.paths.bin_path).unwrap().next().is_none());
        assert!(fs::read_dir(&rt.paths.pkg_path).unwrap().next().is_none());
        let lockfile = LockFile::load(&rt.paths.lock_path, "linux", "amd64").unwrap();
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_uninstall_missing_binary() {
        let (_temp, rt) = runtime();
        install_fake(&rt, &["fzf"]);

        let err = uninstall(&rt, Some("rg"), false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StewError>(),
            Some(&StewError::BinaryNotInstalled {
                binary: "rg".to_string()
            })
        );
    }

    #[test]
    fn test_flag_and_binary_conflict() {
        let (_temp, rt) = runtime();
        let err = uninstall(&rt, Some("fzf"), true).unwrap_err();
        assert_eq!(err.downcast_ref::<StewError>(), Some(&StewError::CliFlagAndInput));
    }
}
