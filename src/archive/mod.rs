//! Recognizing downloaded archives and unpacking them into the scratch directory.

pub mod compressed;
pub mod tar;
pub mod zip;

use crate::errors::StewError;
use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Compression wrapped around a tar stream or a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
    Lz4,
    Snappy,
    Brotli,
}

/// What kind of archive a file name denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar(Codec),
    Rar,
    /// A single compressed file, not a tar
    Compressed(Codec),
}

const TAR_SUFFIXES: &[(&str, Codec)] = &[
    (".tar.gz", Codec::Gzip),
    (".tgz", Codec::Gzip),
    (".tar.bz2", Codec::Bzip2),
    (".tbz2", Codec::Bzip2),
    (".tar.xz", Codec::Xz),
    (".txz", Codec::Xz),
    (".tar.zst", Codec::Zstd),
    (".tar.lz4", Codec::Lz4),
    (".tlz4", Codec::Lz4),
    (".tar.sz", Codec::Snappy),
    (".tsz", Codec::Snappy),
    (".tar.br", Codec::Brotli),
    (".tbr", Codec::Brotli),
    (".tar", Codec::Plain),
];

const COMPRESSED_SUFFIXES: &[(&str, Codec)] = &[
    (".gz", Codec::Gzip),
    (".bz2", Codec::Bzip2),
    (".xz", Codec::Xz),
    (".zst", Codec::Zstd),
    (".lz4", Codec::Lz4),
    (".sz", Codec::Snappy),
    (".br", Codec::Brotli),
];

/// Classify a file by its name; `None` means it is not an archive
pub fn classify(file_name: &str) -> Option<ArchiveKind> {
    let lower = file_name.to_lowercase();

    if lower.ends_with(".zip") {
        return Some(ArchiveKind::Zip);
    }
    if lower.ends_with(".rar") {
        return Some(ArchiveKind::Rar);
    }
    if let Some((_, codec)) = TAR_SUFFIXES.iter().find(|(suffix, _)| lower.ends_with(suffix)) {
        return Some(ArchiveKind::Tar(*codec));
    }
    COMPRESSED_SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(_, codec)| ArchiveKind::Compressed(*codec))
}

/// Whether a downloaded file should be unpacked rather than installed as-is
pub fn is_archive(file_name: &str) -> bool {
    classify(file_name).is_some()
}

/// Wrap `reader` in the decoder for `codec`
pub(crate) fn decoder<'a, R: Read + 'a>(codec: Codec, reader: R) -> Result<Box<dyn Read + 'a>> {
    Ok(match codec {
        Codec::Plain => Box::new(reader),
        Codec::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
        Codec::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
        Codec::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
        Codec::Zstd => {
            Box::new(zstd::Decoder::new(reader).context("Failed to create zstd decoder")?)
        }
        Codec::Lz4 => Box::new(lz4_flex::frame::FrameDecoder::new(reader)),
        Codec::Snappy => Box::new(snap::read::FrameDecoder::new(reader)),
        Codec::Brotli => Box::new(brotli::Decompressor::new(reader, 4096)),
    })
}

/// Unpack `archive_path` into `extract_to`, creating the directory if needed
pub fn unpack(archive_path: &Path, extract_to: &Path) -> Result<()> {
    let file_name = crate::utils::base_name(archive_path);
    let kind = classify(&file_name).ok_or_else(|| StewError::UnsupportedArchive {
        path: archive_path.display().to_string(),
    })?;
    debug!(?kind, archive = %archive_path.display(), "unpacking");

    fs::create_dir_all(extract_to).with_context(|| {
        format!("Failed to create extraction directory: {}", extract_to.display())
    })?;

    match kind {
        ArchiveKind::Zip => zip::extract_zip(archive_path, extract_to),
        ArchiveKind::Tar(codec) => tar::extract_tar(archive_path, codec, extract_to),
        ArchiveKind::Compressed(codec) => {
            compressed::extract_single(archive_path, codec, extract_to).map(|_| ())
        }
        ArchiveKind::Rar => Err(StewError::UnsupportedArchive {
            path: archive_path.display().to_string(),
        }
        .into()),
    }
}
