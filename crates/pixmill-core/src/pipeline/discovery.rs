//! Recursive discovery of images under an extraction root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::PipelineError;

/// Discovers image files under a root directory.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the discovery root
    pub relative: PathBuf,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Recursively find every supported file under `root`.
    ///
    /// Paths come back relative to `root`, sorted. A missing root, a root that
    /// is not a directory, or any unreadable directory along the way fails the
    /// whole discovery.
    pub fn discover(&self, root: &Path) -> Result<Vec<DiscoveredFile>, PipelineError> {
        if !root.is_dir() {
            return Err(PipelineError::Discovery {
                path: root.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| PipelineError::Discovery {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                message: e.to_string(),
            })?;

            let entry_path = entry.path();
            if !entry.file_type().is_file() || !self.is_supported(entry_path) {
                continue;
            }
            let Ok(relative) = entry_path.strip_prefix(root) else {
                continue;
            };
            files.push(DiscoveredFile {
                relative: relative.to_path_buf(),
            });
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }

    /// Async wrapper running [`FileDiscovery::discover`] on the blocking pool.
    pub async fn discover_async(
        &self,
        root: PathBuf,
    ) -> Result<Vec<DiscoveredFile>, PipelineError> {
        let discovery = FileDiscovery::new(self.config.clone());
        let root_for_err = root.clone();
        tokio::task::spawn_blocking(move || discovery.discover(&root))
            .await
            .map_err(|e| PipelineError::Discovery {
                path: root_for_err,
                message: format!("Task join error: {e}"),
            })?
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
