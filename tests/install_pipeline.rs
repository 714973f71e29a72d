//! Detect, install and record a release asset without touching the network.

use anyhow::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::path::Path;
use stew::asset::{Resolution, detect_asset};
use stew::config::StewPaths;
use stew::install::{Installation, install_binary};
use stew::lockfile::{LockFile, PackageData};
use stew::prompt::Prompter;
use tempfile::TempDir;

struct NoPrompt;

impl Prompter for NoPrompt {
    fn select(&self, message: &str, _options: &[String]) -> Result<String> {
        panic!("unexpected prompt: {message}")
    }
    fn confirm(&self, message: &str) -> Result<bool> {
        panic!("unexpected prompt: {message}")
    }
    fn input(&self, message: &str, _default: &str) -> Result<String> {
        panic!("unexpected prompt: {message}")
    }
    fn multi_select(
        &self,
        message: &str,
        _options: &[String],
        _selected: &[String],
    ) -> Result<Vec<String>> {
        panic!("unexpected prompt: {message}")
    }
}

fn write_release_tarball(path: &Path) {
    let encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_size(14);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, "app-v1/app", &b"#!/bin/sh\necho"[..])
        .unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_size(3);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "app-v1/LICENSE", &b"mit"[..])
        .unwrap();

    builder.into_inner().unwrap().finish().unwrap();
}

#[cfg(unix)]
#[test]
fn test_detect_install_and_record() {
    let assets = vec![
        "app-v1-darwin-arm64.tar.gz".to_string(),
        "app-v1-linux-amd64.tar.gz".to_string(),
        "checksums.txt".to_string(),
    ];
    let Resolution::Detected(asset) = detect_asset("darwin", "arm64", &assets) else {
        panic!("asset should be detected");
    };
    assert_eq!(asset, "app-v1-darwin-arm64.tar.gz");

    let temp = TempDir::new().unwrap();
    let paths = StewPaths::new(temp.path().join("stew"), temp.path().join("bin"));
    paths.ensure_dirs().unwrap();
    paths.reset_tmp().unwrap();

    let download_path = paths.pkg_path.join(&asset);
    write_release_tarball(&download_path);

    let mut lockfile = LockFile::load(&paths.lock_path, "darwin", "arm64").unwrap();
    let installed = install_binary(
        &paths,
        &NoPrompt,
        &Installation {
            downloaded_file_path: &download_path,
            repo: "app",
            binary_name: None,
            expected_binary_hash: None,
            batch_mode: true,
        },
        &mut lockfile,
        false,
    )
    .unwrap();
    assert_eq!(installed.name, "app");
    assert!(paths.bin_path.join("app").is_file());
    assert!(!paths.tmp_path.exists());

    lockfile.packages.push(PackageData::github(
        "acme",
        "app",
        "v1",
        &asset,
        &installed.name,
        "https://example.com/app-v1-darwin-arm64.tar.gz",
        Some(installed.hash.clone()),
    ));
    lockfile.save(&paths.lock_path).unwrap();

    let reloaded = LockFile::load(&paths.lock_path, "linux", "amd64").unwrap();
    assert_eq!(reloaded.os, "darwin");
    assert_eq!(reloaded.packages.len(), 1);
    assert_eq!(reloaded.packages[0].binary, "app");
    assert_eq!(reloaded.packages[0].binary_hash, Some(installed.hash));
}
