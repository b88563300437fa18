//! ZIP extraction into a plain directory tree.
//!
//! Entries under the `__MACOSX` resource-fork folder and entries whose base
//! name starts with `.` are skipped. Entry names that would land outside the
//! destination (absolute paths, `..` components) are skipped with a warning.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::ExtractionError;

/// Top-level folder macOS adds to archives for resource forks.
pub const METADATA_DIR: &str = "__MACOSX";

/// Counts from a finished extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Regular files written
    pub files: usize,
    /// Directory entries created
    pub directories: usize,
    /// Hidden, metadata or unsafe entries that were not written
    pub skipped: usize,
}

/// Extracts a ZIP archive into a destination directory.
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Extract `archive` into `dest`, creating `dest` and any intermediate
    /// directories.
    ///
    /// This is blocking I/O; async callers should go through
    /// [`ArchiveExtractor::extract_async`].
    pub fn extract(archive: &Path, dest: &Path) -> Result<ExtractSummary, ExtractionError> {
        if !archive.is_file() {
            return Err(ExtractionError::NotFound(archive.to_path_buf()));
        }

        let file = File::open(archive).map_err(|e| ExtractionError::Unreadable {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut zip = ZipArchive::new(file).map_err(|e| ExtractionError::Unreadable {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;

        create_dir(dest)?;

        let mut summary = ExtractSummary::default();
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| ExtractionError::CorruptEntry {
                    path: archive.to_path_buf(),
                    entry: format!("#{index}"),
                    message: e.to_string(),
                })?;
            let name = entry.name().to_string();

            if is_skipped(&name) {
                tracing::trace!("Skipping {name:?}");
                summary.skipped += 1;
                continue;
            }

            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!("Skipping entry with unsafe path {name:?} in {:?}", archive);
                summary.skipped += 1;
                continue;
            };
            let target = dest.join(relative);

            if entry.is_dir() {
                create_dir(&target)?;
                summary.directories += 1;
                continue;
            }

            if let Some(parent) = target.parent() {
                create_dir(parent)?;
            }
            let out = File::create(&target).map_err(|e| ExtractionError::Write {
                path: target.clone(),
                source: e,
            })?;
            let mut writer = BufWriter::new(out);
            io::copy(&mut entry, &mut writer).map_err(|e| ExtractionError::CorruptEntry {
                path: archive.to_path_buf(),
                entry: name.clone(),
                message: e.to_string(),
            })?;
            writer
                .into_inner()
                .map_err(|e| ExtractionError::Write {
                    path: target.clone(),
                    source: e.into_error(),
                })?
                .sync_all()
                .map_err(|e| ExtractionError::Write {
                    path: target.clone(),
                    source: e,
                })?;

            tracing::trace!("Extracted {name:?}");
            summary.files += 1;
        }

        Ok(summary)
    }

    /// Run [`ArchiveExtractor::extract`] on the blocking thread pool.
    pub async fn extract_async(
        archive: PathBuf,
        dest: PathBuf,
    ) -> Result<ExtractSummary, ExtractionError> {
        let archive_for_err = archive.clone();
        tokio::task::spawn_blocking(move || Self::extract(&archive, &dest))
            .await
            .map_err(|e| ExtractionError::Unreadable {
                path: archive_for_err,
                message: format!("Task join error: {e}"),
            })?
    }
}

/// Whether an entry name is metadata or hidden.
fn is_skipped(name: &str) -> bool {
    if name.starts_with(METADATA_DIR) {
        return true;
    }
    let base = name.trim_end_matches('/').rsplit('/').next().unwrap_or(name);
    base.starts_with('.')
}

fn create_dir(path: &Path) -> Result<(), ExtractionError> {
    fs::create_dir_all(path).map_err(|e| ExtractionError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
