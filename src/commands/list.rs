use crate::config::Runtime;
use crate::lockfile::{LockFile, PackageData, Source};
use crate::render::stdout_color;
use anyhow::Result;
use owo_colors::OwoColorize;

/// One line of `stew list`: `binary: owner/repo[@tag]` or `binary: url`
pub fn format_package(pkg: &PackageData, tags: bool, color: bool) -> String {
    let origin = match pkg.source {
        Source::Github if tags && !pkg.tag.is_empty() => {
            format!("{}/{}@{}", pkg.owner, pkg.repo, pkg.tag)
        }
        Source::Github => format!("{}/{}", pkg.owner, pkg.repo),
        Source::Other => pkg.url.clone(),
    };

    if color {
        format!("{} {origin}", format!("{}:", pkg.binary).green())
    } else {
        format!("{}: {origin}", pkg.binary)
    }
}

/// `stew list`
pub fn list(rt: &Runtime, tags: bool) -> Result<()> {
    let lockfile = LockFile::load(&rt.paths.lock_path, &rt.os, &rt.arch)?;
    let color = stdout_color();
    for pkg in &lockfile.packages {
        println!("{}", format_package(pkg, tags, color));
    }
    Ok(())
}
