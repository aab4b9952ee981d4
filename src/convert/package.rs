//! Embedded video detection in interactive packages.
//!
//! An `.h5p` package is a zip archive. Video-only packages bundle their clip
//! under `content/videos/`; when exactly one such clip exists it is extracted
//! so it can be published as a plain video.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Suffix of bundled video entries
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Directory fragment of bundled video entries
pub const VIDEO_PATH_FRAGMENT: &str = "content/videos";

/// Errors that can occur while reading a package
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Entry escapes the extraction directory: {0}")]
    UnsafeEntry(String),
}

/// Entry names that look like a bundled video
pub fn video_entries<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    names
        .into_iter()
        .filter(|name| name.ends_with(VIDEO_EXTENSION) && name.contains(VIDEO_PATH_FRAGMENT))
        .collect()
}

/// Extract the package's single bundled video, if it has exactly one
///
/// The clip is written below a new temporary directory that is left in place
/// for the uploader; removing it is the caller's job.
pub fn find_embedded_video(package: &Path) -> Result<Option<PathBuf>, PackageError> {
    let file = File::open(package)?;
    let mut archive = ZipArchive::new(file)?;

    let candidates: Vec<String> = video_entries(archive.file_names())
        .into_iter()
        .map(str::to_string)
        .collect();

    match candidates.as_slice() {
        [entry] => {
            let dest = tempfile::Builder::new()
                .prefix("coursechef-")
                .tempdir()?
                .keep();
            let extracted = extract_entry(&mut archive, entry, &dest)?;
            debug!(
                package = %package.display(),
                video = %extracted.display(),
                "Extracted embedded video"
            );
            Ok(Some(extracted))
        }
        [] => Ok(None),
        _ => {
            warn!(
                package = %package.display(),
                count = candidates.len(),
                "Several bundled videos, keeping the package"
            );
            Ok(None)
        }
    }
}

/// Copy one entry below `dest`, keeping its relative path
fn extract_entry(
    archive: &mut ZipArchive<File>,
    name: &str,
    dest: &Path,
) -> Result<PathBuf, PackageError> {
    let mut entry = archive.by_name(name)?;
    let relative = entry
        .enclosed_name()
        .ok_or_else(|| PackageError::UnsafeEntry(name.to_string()))?;

    let target = dest.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = File::create(&target)?;
    io::copy(&mut entry, &mut out)?;

    Ok(target)
}
